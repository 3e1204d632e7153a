//! Template editing workflow
//!
//! Coordinates the open template document with the template service:
//! selecting databases and templates, editing, validating, extracting against
//! sample documents, inserting, and exporting.

pub mod config;
pub mod confirm;
pub mod editor;
pub mod error;
pub mod export;
pub mod gateway;
pub mod notify;
pub mod state;

pub use config::{EditorConfig, EditorSettings, GatewayConfig, UnsavedEditsPolicy};
pub use confirm::{ConfirmationToken, PendingAction};
pub use editor::{ActionOutcome, TemplateEditor};
pub use error::{ErrorKind, GatewayError, WorkflowError};
pub use export::{export_filename, ExportedDocument, DEFAULT_EXPORT_FILENAME};
pub use gateway::{
    ExtractionFailure, ExtractionResult, HttpTemplateGateway, InsertResult, TemplateGateway,
    TemplateList, TemplateSummary, ValidationResult,
};
pub use notify::{Notification, NotificationLevel};
pub use state::{Activity, EditorSnapshot, Phase, Selection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
