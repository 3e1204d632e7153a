//! Error types for the template editing workflow

use tde_core::ModelError;
use thiserror::Error;

/// Failure reaching the template service: network, HTTP status or an
/// unreadable response body. Authentication failures land here too.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl GatewayError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Status { status: 401, .. })
    }
}

/// Broad category of a [`WorkflowError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The template service could not be reached or answered garbage
    Transport,
    /// The service answered and refused the request
    DomainRejection,
    /// A local check failed before anything was sent
    PreconditionViolation,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Message supplied by the template service
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("No content database selected")]
    NoDatabaseSelected,

    #[error("Add the URI of at least one sample document before running extract")]
    NoSampleDocuments,

    #[error("The open template has unsaved edits")]
    UnsavedEdits,

    #[error("This edit must be confirmed before it is applied")]
    ConfirmationRequired,

    #[error("Unknown or already used confirmation token {0}")]
    UnknownConfirmation(u64),

    #[error("The template changed after this action was requested")]
    StaleConfirmation,
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Gateway(_) => ErrorKind::Transport,
            WorkflowError::Rejected(_) => ErrorKind::DomainRejection,
            _ => ErrorKind::PreconditionViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tde_core::Collection;

    #[test]
    fn test_error_kinds() {
        let transport = WorkflowError::from(GatewayError::Transport {
            endpoint: "/api/databases".to_string(),
            message: "connection refused".to_string(),
        });
        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert_eq!(
            WorkflowError::Rejected("bad context".to_string()).kind(),
            ErrorKind::DomainRejection
        );
        assert_eq!(
            WorkflowError::NoSampleDocuments.kind(),
            ErrorKind::PreconditionViolation
        );
        let model = WorkflowError::from(ModelError::IndexOutOfBounds {
            collection: Collection::Vars,
            index: 3,
            len: 3,
        });
        assert_eq!(model.kind(), ErrorKind::PreconditionViolation);
    }

    #[test]
    fn test_rejection_displays_server_message_verbatim() {
        let err = WorkflowError::Rejected("TDE-INVALID: context is required".to_string());
        assert_eq!(err.to_string(), "TDE-INVALID: context is required");
    }

    #[test]
    fn test_unauthorized_status() {
        let err = GatewayError::Status {
            endpoint: "/api/databases".to_string(),
            status: 401,
            body: String::new(),
        };
        assert!(err.is_unauthorized());
    }
}
