//! Template service boundary
//!
//! Everything that touches the content database goes through
//! [`TemplateGateway`]. The editor never sees HTTP; it sees these results or a
//! [`GatewayError`].

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tde_core::TemplateDocument;

use crate::error::GatewayError;

pub use http::HttpTemplateGateway;

fn enabled_by_default() -> bool {
    true
}

/// A template known to a content database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub uri: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl TemplateSummary {
    pub fn enabled(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateList {
    #[serde(default)]
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    #[serde(default)]
    pub message: String,
}

/// Outcome of running a template against sample documents.
///
/// `extracted` is whatever rows and triples the service produced; it is kept
/// as raw JSON for the preview panes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtractionFailure>,
}

#[async_trait]
pub trait TemplateGateway: Send + Sync {
    async fn list_databases(&self) -> Result<Vec<String>, GatewayError>;

    async fn list_templates(&self, database: &str) -> Result<TemplateList, GatewayError>;

    async fn get_template(
        &self,
        database: &str,
        uri: &str,
    ) -> Result<TemplateDocument, GatewayError>;

    async fn validate_template(
        &self,
        doc: &TemplateDocument,
    ) -> Result<ValidationResult, GatewayError>;

    async fn extract_template(
        &self,
        sample_uris: &[String],
        database: &str,
        doc: &TemplateDocument,
    ) -> Result<ExtractionResult, GatewayError>;

    async fn insert_template(
        &self,
        uri: &str,
        database: &str,
        doc: &TemplateDocument,
    ) -> Result<InsertResult, GatewayError>;
}
