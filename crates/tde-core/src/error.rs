use thiserror::Error;

use crate::operations::Direction;

/// Which ordered collection of a template an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Vars,
    Rows,
    Triples,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Vars => write!(f, "vars"),
            Collection::Rows => write!(f, "rows"),
            Collection::Triples => write!(f, "triples"),
        }
    }
}

/// Precondition violations raised by document edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Index {index} out of bounds for {collection} (length {len})")]
    IndexOutOfBounds {
        collection: Collection,
        index: usize,
        len: usize,
    },

    #[error("Cannot move variable {index} {direction}: already at the boundary (length {len})")]
    MoveOutOfBounds {
        index: usize,
        direction: Direction,
        len: usize,
    },

    #[error("Failed to parse template document: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}
