//! Template document model
//!
//! This crate holds the in-memory form of an extraction template and the pure
//! edit operations applied to it. It performs no I/O:
//! - `document`: the `TemplateDocument` tree and its JSON mapping
//! - `operations`: `TemplateEdit` and the value-returning mutations

pub mod document;
pub mod error;
pub mod operations;

pub use document::{Template, TemplateDocument, Triple, TripleTerm, Variable, ViewLayout, ViewRow};
pub use error::{Collection, ModelError};
pub use operations::{Direction, ScalarField, TemplateEdit};

/// Separator between entries when collections or directories are edited as one string
pub const FILTER_DELIMITER: &str = " OR ";

/// Split a `" OR "`-joined filter string into its entries.
///
/// An empty string yields no entries.
pub fn split_filter(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(FILTER_DELIMITER).map(str::to_string).collect()
}

/// Inverse of [`split_filter`]
pub fn join_filter(entries: &[String]) -> String {
    entries.join(FILTER_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_filter_single() {
        assert_eq!(split_filter("orders"), vec!["orders"]);
    }

    #[test]
    fn test_split_filter_many() {
        assert_eq!(split_filter("x OR y OR z"), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_split_filter_empty() {
        assert!(split_filter("").is_empty());
    }

    #[test]
    fn test_split_filter_keeps_lowercase_or() {
        assert_eq!(split_filter("black or white"), vec!["black or white"]);
    }

    #[test]
    fn test_join_filter() {
        let entries = vec!["/a/".to_string(), "/b/".to_string()];
        assert_eq!(join_filter(&entries), "/a/ OR /b/");
        assert_eq!(join_filter(&[]), "");
    }
}
