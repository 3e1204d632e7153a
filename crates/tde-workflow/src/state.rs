//! Editor state shared between in-flight actions

use serde_json::Value;
use std::collections::HashMap;
use tde_core::TemplateDocument;

use crate::confirm::Confirmations;
use crate::error::WorkflowError;
use crate::gateway::TemplateSummary;
use crate::notify::Notification;

/// Counters bumped whenever the user switches database or template.
///
/// An async action records the epochs it started under and drops its result
/// if they moved while it was waiting on the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub database: u64,
    pub template: u64,
}

/// Where the open document is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    DatabaseSelected,
    TemplateLoaded,
    Editing,
}

/// Gateway calls that can be outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Activity {
    LoadingDatabases,
    LoadingTemplates,
    LoadingTemplate,
    Validating,
    Extracting,
    Inserting,
}

#[derive(Debug, Default)]
pub(crate) struct EditorState {
    pub content_dbs: Vec<String>,
    pub selected_content_db: Option<String>,
    pub selected_template_uri: String,
    pub document: TemplateDocument,
    pub sample_uris: Vec<String>,
    pub extracted_data: Option<Value>,
    pub known_templates: Vec<TemplateSummary>,
    pub last_error: Option<WorkflowError>,
    /// Edited since the document was loaded or last inserted
    pub dirty: bool,
    /// Bumped on every change to `document`
    pub revision: u64,
    pub selection: Selection,
    pub notifications: Vec<Notification>,
    pub confirmations: Confirmations,
    pub in_flight: HashMap<Activity, usize>,
}

impl EditorState {
    pub fn phase(&self) -> Phase {
        if self.dirty {
            Phase::Editing
        } else if !self.document.uri.is_empty() {
            Phase::TemplateLoaded
        } else if self.selected_content_db.is_some() {
            Phase::DatabaseSelected
        } else {
            Phase::Empty
        }
    }

    /// Replace the document, bumping the revision
    pub fn set_document(&mut self, document: TemplateDocument, dirty: bool) {
        self.document = document;
        self.dirty = dirty;
        self.revision += 1;
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        let mut in_flight: Vec<Activity> = self
            .in_flight
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(activity, _)| *activity)
            .collect();
        in_flight.sort();

        EditorSnapshot {
            phase: self.phase(),
            content_dbs: self.content_dbs.clone(),
            selected_content_db: self.selected_content_db.clone(),
            selected_template_uri: self.selected_template_uri.clone(),
            document: self.document.clone(),
            sample_uris: self.sample_uris.clone(),
            extracted_data: self.extracted_data.clone(),
            known_templates: self.known_templates.clone(),
            last_error: self.last_error.clone(),
            dirty: self.dirty,
            in_flight,
            pending_confirmations: self.confirmations.len(),
        }
    }
}

/// Read-only copy of the editor state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSnapshot {
    pub phase: Phase,
    pub content_dbs: Vec<String>,
    /// `None` until a database is chosen
    pub selected_content_db: Option<String>,
    pub selected_template_uri: String,
    pub document: TemplateDocument,
    pub sample_uris: Vec<String>,
    pub extracted_data: Option<Value>,
    pub known_templates: Vec<TemplateSummary>,
    pub last_error: Option<WorkflowError>,
    pub dirty: bool,
    pub in_flight: Vec<Activity>,
    pub pending_confirmations: usize,
}
