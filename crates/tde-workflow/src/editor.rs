//! Template editor workflow
//!
//! [`TemplateEditor`] owns the open template and everything around it
//! (selected database, sample documents, last extraction) and turns user
//! actions into document edits and gateway calls.
//!
//! State sits behind a lock that is never held across a gateway call, so
//! several actions can be outstanding at once. Each call records the
//! [`Selection`] it started under; if the user switched database or template
//! before the answer arrived, the answer is dropped.

use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tde_core::{TemplateDocument, TemplateEdit};

use crate::config::UnsavedEditsPolicy;
use crate::confirm::{ConfirmationToken, PendingAction};
use crate::error::{GatewayError, WorkflowError};
use crate::export::{self, ExportedDocument};
use crate::gateway::{TemplateGateway, TemplateSummary};
use crate::notify::Notification;
use crate::state::{Activity, EditorSnapshot, EditorState, Selection};

/// How an action ended. Gateway failures end up here rather than in an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Completed,
    /// The service refused the request; carries its message
    Rejected(String),
    /// The service could not be reached
    Failed(GatewayError),
    /// A local precondition failed; nothing was sent
    Blocked(WorkflowError),
    /// The selection changed while the call was in flight; result dropped
    Stale,
    /// The user declined a confirmation
    Declined,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed)
    }
}

fn read_state(state: &RwLock<EditorState>) -> RwLockReadGuard<'_, EditorState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_state(state: &RwLock<EditorState>) -> RwLockWriteGuard<'_, EditorState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

/// Marks an activity as outstanding until dropped
struct InFlight {
    state: Arc<RwLock<EditorState>>,
    activity: Activity,
}

impl InFlight {
    fn start(state: &Arc<RwLock<EditorState>>, activity: Activity) -> Self {
        *write_state(state).in_flight.entry(activity).or_insert(0) += 1;
        Self {
            state: Arc::clone(state),
            activity,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = write_state(&self.state);
        if let Entry::Occupied(mut entry) = state.in_flight.entry(self.activity) {
            let count = entry.get_mut();
            *count = count.saturating_sub(1);
        }
    }
}

pub struct TemplateEditor<G> {
    gateway: Arc<G>,
    state: Arc<RwLock<EditorState>>,
    policy: UnsavedEditsPolicy,
}

impl<G> Clone for TemplateEditor<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
            policy: self.policy,
        }
    }
}

impl<G: TemplateGateway> TemplateEditor<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_shared_gateway(Arc::new(gateway))
    }

    pub fn with_shared_gateway(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: Arc::new(RwLock::new(EditorState::default())),
            policy: UnsavedEditsPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnsavedEditsPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnsavedEditsPolicy {
        self.policy
    }

    fn read(&self) -> RwLockReadGuard<'_, EditorState> {
        read_state(&self.state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EditorState> {
        write_state(&self.state)
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        self.read().snapshot()
    }

    pub fn document(&self) -> TemplateDocument {
        self.read().document.clone()
    }

    /// Drain notifications raised since the last call
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.write().notifications)
    }

    fn block(&self, title: &str, error: WorkflowError) -> ActionOutcome {
        tracing::warn!("{} blocked: {}", title, error);
        self.write()
            .notify(Notification::warning(title, &error.to_string()));
        ActionOutcome::Blocked(error)
    }

    fn fail(state: &mut EditorState, error: GatewayError, notification: Notification) -> ActionOutcome {
        tracing::warn!("{}", error);
        state.last_error = Some(WorkflowError::Gateway(error.clone()));
        state.notify(notification);
        ActionOutcome::Failed(error)
    }

    // ============ Selection ============

    /// Fetch the list of content databases
    pub async fn load_databases(&self) -> ActionOutcome {
        let _guard = InFlight::start(&self.state, Activity::LoadingDatabases);
        let result = self.gateway.list_databases().await;

        let mut state = self.write();
        match result {
            Ok(databases) => {
                tracing::info!("Loaded {} content databases", databases.len());
                state.content_dbs = databases;
                ActionOutcome::Completed
            }
            Err(e) => {
                let notification = Notification::error("Databases", Some(e.to_string()));
                Self::fail(&mut state, e, notification)
            }
        }
    }

    /// Choose a content database and refresh its template list.
    ///
    /// Switching to a different database closes the open template. If the
    /// list cannot be fetched the previous list is kept.
    pub async fn select_database(&self, name: &str) -> ActionOutcome {
        let started = {
            let mut state = self.write();
            if state.selected_content_db.as_deref() != Some(name) {
                state.selected_template_uri.clear();
                state.set_document(TemplateDocument::new(), false);
                state.extracted_data = None;
            }
            state.selected_content_db = Some(name.to_string());
            state.selection.database += 1;
            state.selection
        };
        tracing::info!("Selected content database {}", name);

        let _guard = InFlight::start(&self.state, Activity::LoadingTemplates);
        let result = self.gateway.list_templates(name).await;

        let mut state = self.write();
        if state.selection.database != started.database {
            tracing::debug!("Dropping template list for {}: database changed", name);
            return ActionOutcome::Stale;
        }
        match result {
            Ok(list) => {
                tracing::info!("{} has {} templates", name, list.templates.len());
                state.known_templates = list.templates;
                ActionOutcome::Completed
            }
            Err(e) => {
                let notification = Notification::error("Templates", Some(e.to_string()));
                Self::fail(&mut state, e, notification)
            }
        }
    }

    /// Open a stored template, replacing the document in memory.
    ///
    /// Unsaved edits are discarded unless the editor was built with
    /// [`UnsavedEditsPolicy::Refuse`]. The selected template URI moves only
    /// when the document it names is applied.
    pub async fn select_template(&self, uri: &str) -> ActionOutcome {
        let prepared = {
            let mut state = self.write();
            match state.selected_content_db.clone() {
                None => Err(WorkflowError::NoDatabaseSelected),
                Some(_) if self.policy == UnsavedEditsPolicy::Refuse && state.dirty => {
                    Err(WorkflowError::UnsavedEdits)
                }
                Some(database) => {
                    state.selection.template += 1;
                    Ok((database, state.selection, state.revision))
                }
            }
        };
        let (database, started, revision) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.block("Template", e),
        };

        let _guard = InFlight::start(&self.state, Activity::LoadingTemplate);
        let result = self.gateway.get_template(&database, uri).await;

        let mut state = self.write();
        if state.selection != started {
            tracing::debug!("Dropping template {}: selection changed", uri);
            return ActionOutcome::Stale;
        }
        if self.policy == UnsavedEditsPolicy::Refuse && state.revision != revision {
            tracing::debug!("Dropping template {}: document edited while loading", uri);
            return ActionOutcome::Stale;
        }
        match result {
            Ok(mut doc) => {
                tracing::info!("Loaded template {} from {}", uri, database);
                doc.uri = uri.to_string();
                state.selected_template_uri = uri.to_string();
                state.set_document(doc, false);
                ActionOutcome::Completed
            }
            Err(e) => {
                let notification = Notification::error("Template", Some(e.to_string()));
                Self::fail(&mut state, e, notification)
            }
        }
    }

    /// Change the URI the template will be inserted under
    pub fn rename_template(&self, uri: &str) {
        self.write().selected_template_uri = uri.to_string();
    }

    /// Open a document that did not come from the gateway, e.g. a local file.
    ///
    /// Follows the same unsaved-edits policy as [`TemplateEditor::select_template`].
    pub fn load_document(&self, doc: TemplateDocument) -> Result<(), WorkflowError> {
        let mut state = self.write();
        if self.policy == UnsavedEditsPolicy::Refuse && state.dirty {
            return Err(WorkflowError::UnsavedEdits);
        }
        if !doc.uri.is_empty() {
            state.selected_template_uri = doc.uri.clone();
        }
        state.selection.template += 1;
        state.set_document(doc, false);
        Ok(())
    }

    // ============ Editing ============

    /// Apply a non-destructive edit to the open document.
    ///
    /// Removals must go through [`TemplateEditor::request`].
    pub fn edit(&self, edit: TemplateEdit) -> Result<(), WorkflowError> {
        if edit.requires_confirmation() {
            return Err(WorkflowError::ConfirmationRequired);
        }
        self.apply_edit(&edit)
    }

    fn apply_edit(&self, edit: &TemplateEdit) -> Result<(), WorkflowError> {
        let mut state = self.write();
        let next = state.document.apply(edit)?;
        state.set_document(next, true);
        Ok(())
    }

    /// Ask for confirmation before running `action`.
    ///
    /// Edits are checked against the current document first, so an
    /// out-of-range removal fails here rather than after the prompt.
    pub fn request(&self, action: PendingAction) -> Result<ConfirmationToken, WorkflowError> {
        let mut state = self.write();
        if let PendingAction::Edit(edit) = &action {
            state.document.apply(edit)?;
        }
        let revision = state.revision;
        Ok(state.confirmations.issue(action, revision))
    }

    /// Run a previously requested action
    pub async fn confirm(&self, token: ConfirmationToken) -> Result<ActionOutcome, WorkflowError> {
        let pending = self
            .write()
            .confirmations
            .take(token)
            .ok_or(WorkflowError::UnknownConfirmation(token.id()))?;

        match pending.action {
            PendingAction::Edit(edit) => {
                let mut state = self.write();
                if state.revision != pending.revision {
                    return Err(WorkflowError::StaleConfirmation);
                }
                let next = state.document.apply(&edit)?;
                state.set_document(next, true);
                tracing::info!("Applied confirmed edit {:?}", edit);
                Ok(ActionOutcome::Completed)
            }
            PendingAction::Insert => Ok(self.run_insert().await),
        }
    }

    /// Drop a previously requested action without running it
    pub fn decline(&self, token: ConfirmationToken) -> Result<ActionOutcome, WorkflowError> {
        let pending = self
            .write()
            .confirmations
            .take(token)
            .ok_or(WorkflowError::UnknownConfirmation(token.id()))?;
        tracing::info!("Declined {:?}", pending.action);
        Ok(ActionOutcome::Declined)
    }

    // ============ Sample documents ============

    /// Returns false if the URI is empty or already present
    pub fn add_sample(&self, uri: &str) -> bool {
        let mut state = self.write();
        if uri.is_empty() || state.sample_uris.iter().any(|u| u == uri) {
            return false;
        }
        state.sample_uris.push(uri.to_string());
        true
    }

    /// Returns false if the URI was not present
    pub fn remove_sample(&self, uri: &str) -> bool {
        let mut state = self.write();
        let before = state.sample_uris.len();
        state.sample_uris.retain(|u| u != uri);
        state.sample_uris.len() != before
    }

    // ============ Gateway actions ============

    /// Ask the service whether the in-memory document is a valid template
    pub async fn run_validate(&self) -> ActionOutcome {
        let (doc, started) = {
            let state = self.read();
            (state.document.clone(), state.selection)
        };

        let _guard = InFlight::start(&self.state, Activity::Validating);
        let result = self.gateway.validate_template(&doc).await;

        let mut state = self.write();
        if state.selection != started {
            tracing::debug!("Dropping validation result: selection changed");
            return ActionOutcome::Stale;
        }
        match result {
            Ok(verdict) if verdict.valid => {
                tracing::info!("Template is valid");
                state.notify(Notification::success("Validation", "This template is valid"));
                ActionOutcome::Completed
            }
            Ok(verdict) => {
                let message = verdict.message.unwrap_or_default();
                tracing::info!("Template is not valid: {}", message);
                let mut body = "This template is not valid".to_string();
                if !message.is_empty() {
                    body.push('\n');
                    body.push_str(&message);
                }
                state.notify(Notification::error("Validation", Some(body)));
                ActionOutcome::Rejected(message)
            }
            Err(e) => {
                let notification =
                    Notification::error("Validation", Some(format!("validation call failed: {}", e)));
                Self::fail(&mut state, e, notification)
            }
        }
    }

    /// Run the document against the sample URIs and keep the extracted preview
    pub async fn run_extract(&self) -> ActionOutcome {
        let prepared = {
            let state = self.read();
            if state.sample_uris.is_empty() {
                Err(WorkflowError::NoSampleDocuments)
            } else {
                match &state.selected_content_db {
                    None => Err(WorkflowError::NoDatabaseSelected),
                    Some(database) => Ok((
                        state.sample_uris.clone(),
                        database.clone(),
                        state.document.clone(),
                        state.selection,
                    )),
                }
            }
        };
        let (samples, database, doc, started) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.block("Extraction", e),
        };

        let _guard = InFlight::start(&self.state, Activity::Extracting);
        let result = self
            .gateway
            .extract_template(&samples, &database, &doc)
            .await;

        let mut state = self.write();
        if state.selection != started {
            tracing::debug!("Dropping extraction result: selection changed");
            return ActionOutcome::Stale;
        }
        match result {
            Ok(extraction) if extraction.success => {
                tracing::info!("Extracted from {} sample documents", samples.len());
                state.extracted_data = extraction.extracted;
                state.notify(Notification::success("Extraction", "Extraction succeeded"));
                ActionOutcome::Completed
            }
            Ok(extraction) => {
                let message = extraction.error.map(|e| e.message).unwrap_or_default();
                tracing::warn!("Extraction rejected: {}", message);
                state.extracted_data = None;
                state.last_error = Some(WorkflowError::Rejected(message.clone()));
                state.notify(Notification::error("Extraction Failed", Some(message.clone())));
                ActionOutcome::Rejected(message)
            }
            Err(e) => {
                state.extracted_data = None;
                Self::fail(&mut state, e, Notification::error("Extraction Failed", None))
            }
        }
    }

    /// Store the document under the selected template URI.
    /// Reached through [`TemplateEditor::confirm`] of [`PendingAction::Insert`].
    async fn run_insert(&self) -> ActionOutcome {
        let prepared = {
            let state = self.read();
            match &state.selected_content_db {
                None => Err(WorkflowError::NoDatabaseSelected),
                Some(database) => Ok((
                    state.selected_template_uri.clone(),
                    database.clone(),
                    state.document.clone(),
                    state.selection,
                    state.revision,
                )),
            }
        };
        let (uri, database, doc, started, revision) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.block("Insert", e),
        };

        let _guard = InFlight::start(&self.state, Activity::Inserting);
        let result = self.gateway.insert_template(&uri, &database, &doc).await;

        // The insert has happened server-side; only a database switch
        // makes the outcome irrelevant to what the user is looking at.
        let mut state = self.write();
        if state.selection.database != started.database {
            tracing::debug!("Dropping insert result for {}: database changed", uri);
            return ActionOutcome::Stale;
        }
        match result {
            Ok(inserted) if inserted.valid => {
                tracing::info!("Inserted template {} into {}", uri, database);
                state.notify(Notification::success("Insert", "Insert succeeded"));
                if !state.known_templates.iter().any(|t| t.uri == uri) {
                    state.known_templates.push(TemplateSummary::enabled(&uri));
                }
                if state.revision == revision {
                    state.dirty = false;
                }
                ActionOutcome::Completed
            }
            Ok(inserted) => {
                let message = inserted.message.unwrap_or_default();
                tracing::warn!("Insert of {} rejected: {}", uri, message);
                state.last_error = Some(WorkflowError::Rejected(message.clone()));
                state.notify(Notification::error("Insert", Some(message.clone())));
                ActionOutcome::Rejected(message)
            }
            Err(e) => {
                let notification =
                    Notification::error("Insert", Some(format!("insert call failed: {}", e)));
                Self::fail(&mut state, e, notification)
            }
        }
    }

    // ============ Export ============

    /// Serialize the open document, named after the selected template URI
    pub fn export_document(&self) -> Result<ExportedDocument, WorkflowError> {
        let state = self.read();
        Ok(export::export_document(
            &state.document,
            &state.selected_template_uri,
        )?)
    }
}
