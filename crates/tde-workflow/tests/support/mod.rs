//! In-memory template service for workflow tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tde_core::TemplateDocument;
use tde_workflow::{
    ExtractionResult, GatewayError, InsertResult, TemplateGateway, TemplateList,
    TemplateSummary, ValidationResult,
};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListDatabases,
    ListTemplates(String),
    GetTemplate { database: String, uri: String },
    Validate(TemplateDocument),
    Extract { samples: Vec<String>, database: String },
    Insert { uri: String, database: String },
}

pub fn transport_error(endpoint: &str) -> GatewayError {
    GatewayError::Transport {
        endpoint: endpoint.to_string(),
        message: "connection refused".to_string(),
    }
}

/// Answers from canned responses and records every call.
///
/// A call whose key has a gate registered waits until the gate is released,
/// which lets a test finish a later call before an earlier one.
pub struct ScriptedGateway {
    databases: Mutex<Result<Vec<String>, GatewayError>>,
    templates: Mutex<HashMap<String, Result<TemplateList, GatewayError>>>,
    documents: Mutex<HashMap<String, Result<TemplateDocument, GatewayError>>>,
    validation: Mutex<Result<ValidationResult, GatewayError>>,
    extraction: Mutex<Result<ExtractionResult, GatewayError>>,
    insert: Mutex<Result<InsertResult, GatewayError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            databases: Mutex::new(Ok(vec!["Documents".to_string()])),
            templates: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            validation: Mutex::new(Ok(ValidationResult {
                valid: true,
                message: None,
            })),
            extraction: Mutex::new(Ok(ExtractionResult {
                success: true,
                extracted: None,
                error: None,
            })),
            insert: Mutex::new(Ok(InsertResult {
                valid: true,
                message: None,
            })),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_databases(self, result: Result<Vec<String>, GatewayError>) -> Self {
        *self.databases.lock().unwrap() = result;
        self
    }

    pub fn with_templates(self, database: &str, uris: &[&str]) -> Self {
        let list = TemplateList {
            templates: uris.iter().map(|uri| TemplateSummary::enabled(uri)).collect(),
        };
        self.templates
            .lock()
            .unwrap()
            .insert(database.to_string(), Ok(list));
        self
    }

    pub fn with_template_list_error(self, database: &str, error: GatewayError) -> Self {
        self.templates
            .lock()
            .unwrap()
            .insert(database.to_string(), Err(error));
        self
    }

    pub fn with_document(self, uri: &str, doc: TemplateDocument) -> Self {
        self.documents.lock().unwrap().insert(uri.to_string(), Ok(doc));
        self
    }

    pub fn with_document_error(self, uri: &str, error: GatewayError) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(uri.to_string(), Err(error));
        self
    }

    pub fn with_validation(self, result: Result<ValidationResult, GatewayError>) -> Self {
        *self.validation.lock().unwrap() = result;
        self
    }

    pub fn with_extraction(self, result: Result<ExtractionResult, GatewayError>) -> Self {
        *self.extraction.lock().unwrap() = result;
        self
    }

    pub fn with_insert(self, result: Result<InsertResult, GatewayError>) -> Self {
        *self.insert.lock().unwrap() = result;
        self
    }

    /// Hold calls for `key` (a database name, template URI, or "validate",
    /// "extract", "insert") until [`ScriptedGateway::release`]
    pub fn hold(&self, key: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, key: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(key) {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: Call, key: &str) {
        self.calls.lock().unwrap().push(call);
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl TemplateGateway for ScriptedGateway {
    async fn list_databases(&self) -> Result<Vec<String>, GatewayError> {
        self.record(Call::ListDatabases, "databases").await;
        self.databases.lock().unwrap().clone()
    }

    async fn list_templates(&self, database: &str) -> Result<TemplateList, GatewayError> {
        self.record(Call::ListTemplates(database.to_string()), database)
            .await;
        self.templates
            .lock()
            .unwrap()
            .get(database)
            .cloned()
            .unwrap_or_else(|| Ok(TemplateList::default()))
    }

    async fn get_template(
        &self,
        database: &str,
        uri: &str,
    ) -> Result<TemplateDocument, GatewayError> {
        self.record(
            Call::GetTemplate {
                database: database.to_string(),
                uri: uri.to_string(),
            },
            uri,
        )
        .await;
        self.documents
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .unwrap_or_else(|| {
                Err(GatewayError::Status {
                    endpoint: "/api/tde/template/get".to_string(),
                    status: 404,
                    body: format!("{} not found", uri),
                })
            })
    }

    async fn validate_template(
        &self,
        doc: &TemplateDocument,
    ) -> Result<ValidationResult, GatewayError> {
        self.record(Call::Validate(doc.clone()), "validate").await;
        self.validation.lock().unwrap().clone()
    }

    async fn extract_template(
        &self,
        sample_uris: &[String],
        database: &str,
        _doc: &TemplateDocument,
    ) -> Result<ExtractionResult, GatewayError> {
        self.record(
            Call::Extract {
                samples: sample_uris.to_vec(),
                database: database.to_string(),
            },
            "extract",
        )
        .await;
        self.extraction.lock().unwrap().clone()
    }

    async fn insert_template(
        &self,
        uri: &str,
        database: &str,
        _doc: &TemplateDocument,
    ) -> Result<InsertResult, GatewayError> {
        self.record(
            Call::Insert {
                uri: uri.to_string(),
                database: database.to_string(),
            },
            "insert",
        )
        .await;
        self.insert.lock().unwrap().clone()
    }
}
