//! Two-step confirmation for destructive actions
//!
//! The editor hands out a [`ConfirmationToken`] for an action; the
//! presentation layer asks the user and answers with confirm or decline.

use std::collections::HashMap;
use tde_core::TemplateEdit;

/// Prompt shown before deleting a variable or view row
pub const DELETE_PROMPT: &str = "Are you sure you want to delete?";
/// Prompt shown before inserting a template
pub const INSERT_PROMPT: &str = "Inserting the template may cause reindexing. Proceed?";

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Edit(TemplateEdit),
    Insert,
}

impl PendingAction {
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingAction::Edit(_) => DELETE_PROMPT,
            PendingAction::Insert => INSERT_PROMPT,
        }
    }
}

/// Single-use handle for a pending action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmationToken(u64);

impl ConfirmationToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PendingConfirmation {
    pub action: PendingAction,
    /// Document revision when the action was requested
    pub revision: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Confirmations {
    next_id: u64,
    pending: HashMap<u64, PendingConfirmation>,
}

impl Confirmations {
    pub fn issue(&mut self, action: PendingAction, revision: u64) -> ConfirmationToken {
        let id = self.next_id;
        self.next_id += 1;
        self.pending
            .insert(id, PendingConfirmation { action, revision });
        ConfirmationToken(id)
    }

    pub fn take(&mut self, token: ConfirmationToken) -> Option<PendingConfirmation> {
        self.pending.remove(&token.0)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_single_use() {
        let mut confirmations = Confirmations::default();
        let a = confirmations.issue(PendingAction::Insert, 0);
        let b = confirmations.issue(PendingAction::Edit(TemplateEdit::RemoveVariable { index: 0 }), 3);
        assert_ne!(a, b);
        assert_eq!(confirmations.len(), 2);

        let taken = confirmations.take(b).unwrap();
        assert_eq!(taken.revision, 3);
        assert!(confirmations.take(b).is_none());
        assert_eq!(confirmations.len(), 1);
    }

    #[test]
    fn test_prompts() {
        assert_eq!(PendingAction::Insert.prompt(), INSERT_PROMPT);
        assert_eq!(
            PendingAction::Edit(TemplateEdit::RemoveViewRow { index: 1 }).prompt(),
            DELETE_PROMPT
        );
    }
}
