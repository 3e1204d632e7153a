//! Export of the open template to a downloadable file

use tde_core::{ModelError, TemplateDocument};

/// File name used when the template URI has no trailing segment
pub const DEFAULT_EXPORT_FILENAME: &str = "template.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub filename: String,
    /// Pretty-printed JSON body
    pub contents: Vec<u8>,
}

/// The part of `uri` after its last `/`, or [`DEFAULT_EXPORT_FILENAME`]
pub fn export_filename(uri: &str) -> String {
    uri.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_EXPORT_FILENAME)
        .to_string()
}

pub fn export_document(
    doc: &TemplateDocument,
    template_uri: &str,
) -> Result<ExportedDocument, ModelError> {
    Ok(ExportedDocument {
        filename: export_filename(template_uri),
        contents: doc.to_json_pretty()?.into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filename_from_trailing_segment() {
        assert_eq!(export_filename("/db/templates/foo.json"), "foo.json");
        assert_eq!(export_filename("foo.json"), "foo.json");
    }

    #[test]
    fn test_filename_defaults() {
        assert_eq!(export_filename(""), "template.json");
        assert_eq!(export_filename("/templates/"), "template.json");
    }

    #[test]
    fn test_export_reloads_to_equal_document() {
        let doc = TemplateDocument::new()
            .set_collections_field("orders OR archive")
            .add_variable()
            .add_view_row()
            .add_triple();
        let exported = export_document(&doc, "/templates/orders.json").unwrap();
        assert_eq!(exported.filename, "orders.json");

        let reloaded = TemplateDocument::from_slice(&exported.contents).unwrap();
        assert_eq!(reloaded, doc);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_filename_is_last_segment(
            dirs in proptest::collection::vec("[a-z0-9]{1,8}", 0..4),
            name in "[a-zA-Z0-9_-]{1,20}\\.json"
        ) {
            let uri = format!("/{}/{}", dirs.join("/"), name);
            prop_assert_eq!(export_filename(&uri), name);
        }

        #[test]
        fn prop_filename_never_contains_slash(uri in ".*") {
            let filename = export_filename(&uri);
            prop_assert!(!filename.contains('/'));
            prop_assert!(!filename.is_empty());
        }
    }
}
