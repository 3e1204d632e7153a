//! Edit operations over a template document
//!
//! Every operation takes the current document by reference and returns a new
//! document; the input is never modified. Index-based operations fail with
//! [`ModelError`] instead of clamping, so a rejected edit leaves the caller's
//! document exactly as it was.

use serde::{Deserialize, Serialize};

use crate::document::{TemplateDocument, Triple, Variable, ViewRow};
use crate::error::{Collection, ModelError};
use crate::split_filter;

/// Direction for reordering a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Free-text fields that can be replaced wholesale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarField {
    #[serde(rename = "templateURI")]
    Uri,
    Description,
    Context,
}

/// A single user edit, serializable so edit scripts can be stored and replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TemplateEdit {
    SetScalar {
        field: ScalarField,
        value: String,
    },
    /// `joined` is the `" OR "`-delimited display string
    SetCollections {
        joined: String,
    },
    SetDirectories {
        joined: String,
    },
    AddVariable,
    RemoveVariable {
        index: usize,
    },
    MoveVariable {
        index: usize,
        direction: Direction,
    },
    ReplaceVariable {
        index: usize,
        variable: Variable,
    },
    AddViewRow,
    RemoveViewRow {
        index: usize,
    },
    ReplaceViewRow {
        index: usize,
        row: ViewRow,
    },
    AddTriple,
    ReplaceTriple {
        index: usize,
        triple: Triple,
    },
}

impl TemplateEdit {
    /// Destructive edits must be confirmed by the user before they are applied
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            TemplateEdit::RemoveVariable { .. } | TemplateEdit::RemoveViewRow { .. }
        )
    }
}

fn check_index(collection: Collection, index: usize, len: usize) -> Result<(), ModelError> {
    if index < len {
        Ok(())
    } else {
        Err(ModelError::IndexOutOfBounds {
            collection,
            index,
            len,
        })
    }
}

fn replace_at<T>(
    items: &mut Option<Vec<T>>,
    collection: Collection,
    index: usize,
    value: T,
) -> Result<(), ModelError> {
    let items = items.get_or_insert_with(Vec::new);
    check_index(collection, index, items.len())?;
    items[index] = value;
    Ok(())
}

fn remove_at<T>(
    items: &mut Option<Vec<T>>,
    collection: Collection,
    index: usize,
) -> Result<(), ModelError> {
    let items = items.get_or_insert_with(Vec::new);
    check_index(collection, index, items.len())?;
    items.remove(index);
    Ok(())
}

impl TemplateDocument {
    pub fn set_scalar_field(&self, field: ScalarField, value: &str) -> Self {
        let mut doc = self.clone();
        match field {
            ScalarField::Uri => doc.uri = value.to_string(),
            ScalarField::Description => doc.template.description = Some(value.to_string()),
            ScalarField::Context => doc.template.context = Some(value.to_string()),
        }
        doc
    }

    pub fn set_collections_field(&self, joined: &str) -> Self {
        let mut doc = self.clone();
        doc.template.collections = Some(split_filter(joined));
        doc
    }

    pub fn set_directories_field(&self, joined: &str) -> Self {
        let mut doc = self.clone();
        doc.template.directories = Some(split_filter(joined));
        doc
    }

    /// Append an empty variable
    pub fn add_variable(&self) -> Self {
        let mut doc = self.clone();
        doc.template
            .vars
            .get_or_insert_with(Vec::new)
            .push(Variable::default());
        doc
    }

    pub fn remove_variable(&self, index: usize) -> Result<Self, ModelError> {
        let mut doc = self.clone();
        remove_at(&mut doc.template.vars, Collection::Vars, index)?;
        Ok(doc)
    }

    /// Swap the variable at `index` with its neighbour in `direction`
    pub fn move_variable(&self, index: usize, direction: Direction) -> Result<Self, ModelError> {
        let len = self.template.vars().len();
        check_index(Collection::Vars, index, len)?;

        let neighbour = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < len => index + 1,
            _ => {
                return Err(ModelError::MoveOutOfBounds {
                    index,
                    direction,
                    len,
                })
            }
        };

        let mut doc = self.clone();
        doc.template
            .vars
            .get_or_insert_with(Vec::new)
            .swap(index, neighbour);
        Ok(doc)
    }

    pub fn replace_variable(&self, index: usize, variable: Variable) -> Result<Self, ModelError> {
        let mut doc = self.clone();
        replace_at(&mut doc.template.vars, Collection::Vars, index, variable)?;
        Ok(doc)
    }

    /// Append a sparse view row with no columns
    pub fn add_view_row(&self) -> Self {
        let mut doc = self.clone();
        doc.template
            .rows
            .get_or_insert_with(Vec::new)
            .push(ViewRow::new());
        doc
    }

    pub fn remove_view_row(&self, index: usize) -> Result<Self, ModelError> {
        let mut doc = self.clone();
        remove_at(&mut doc.template.rows, Collection::Rows, index)?;
        Ok(doc)
    }

    pub fn replace_view_row(&self, index: usize, row: ViewRow) -> Result<Self, ModelError> {
        let mut doc = self.clone();
        replace_at(&mut doc.template.rows, Collection::Rows, index, row)?;
        Ok(doc)
    }

    /// Append a triple whose subject, predicate and object are all empty
    pub fn add_triple(&self) -> Self {
        let mut doc = self.clone();
        doc.template
            .triples
            .get_or_insert_with(Vec::new)
            .push(Triple::default());
        doc
    }

    pub fn replace_triple(&self, index: usize, triple: Triple) -> Result<Self, ModelError> {
        let mut doc = self.clone();
        replace_at(&mut doc.template.triples, Collection::Triples, index, triple)?;
        Ok(doc)
    }

    /// Apply one edit
    pub fn apply(&self, edit: &TemplateEdit) -> Result<Self, ModelError> {
        match edit {
            TemplateEdit::SetScalar { field, value } => Ok(self.set_scalar_field(*field, value)),
            TemplateEdit::SetCollections { joined } => Ok(self.set_collections_field(joined)),
            TemplateEdit::SetDirectories { joined } => Ok(self.set_directories_field(joined)),
            TemplateEdit::AddVariable => Ok(self.add_variable()),
            TemplateEdit::RemoveVariable { index } => self.remove_variable(*index),
            TemplateEdit::MoveVariable { index, direction } => {
                self.move_variable(*index, *direction)
            }
            TemplateEdit::ReplaceVariable { index, variable } => {
                self.replace_variable(*index, variable.clone())
            }
            TemplateEdit::AddViewRow => Ok(self.add_view_row()),
            TemplateEdit::RemoveViewRow { index } => self.remove_view_row(*index),
            TemplateEdit::ReplaceViewRow { index, row } => {
                self.replace_view_row(*index, row.clone())
            }
            TemplateEdit::AddTriple => Ok(self.add_triple()),
            TemplateEdit::ReplaceTriple { index, triple } => {
                self.replace_triple(*index, triple.clone())
            }
        }
    }

    /// Apply edits in order, stopping at the first failure
    pub fn apply_all(&self, edits: &[TemplateEdit]) -> Result<Self, ModelError> {
        edits
            .iter()
            .try_fold(self.clone(), |doc, edit| doc.apply(edit))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn vars_strategy() -> impl Strategy<Value = Vec<Variable>> {
        proptest::collection::vec(
            ("[a-z]{0,6}", "[a-z@$/]{0,8}").prop_map(|(n, v)| Variable::new(&n, &v)),
            0..12,
        )
    }

    fn doc_with(vars: Vec<Variable>) -> TemplateDocument {
        let mut doc = TemplateDocument::new();
        doc.template.vars = Some(vars);
        doc
    }

    proptest! {
        #[test]
        fn prop_move_up_then_down_restores(vars in vars_strategy(), seed in any::<usize>()) {
            prop_assume!(vars.len() >= 2);
            let index = 1 + seed % (vars.len() - 1);
            let doc = doc_with(vars.clone());
            let moved = doc.move_variable(index, Direction::Up).unwrap();
            let restored = moved.move_variable(index - 1, Direction::Down).unwrap();
            prop_assert_eq!(restored.template.vars(), vars.as_slice());
        }

        #[test]
        fn prop_add_variable_grows_by_one(vars in vars_strategy()) {
            let doc = doc_with(vars.clone());
            let added = doc.add_variable();
            prop_assert_eq!(added.template.vars().len(), vars.len() + 1);
            prop_assert_eq!(added.template.vars().last(), Some(&Variable::default()));
        }

        #[test]
        fn prop_remove_out_of_range_leaves_doc(vars in vars_strategy(), extra in 0usize..5) {
            let doc = doc_with(vars.clone());
            let before = doc.clone();
            prop_assert!(doc.remove_variable(vars.len() + extra).is_err());
            prop_assert_eq!(doc, before);
        }

        #[test]
        fn prop_remove_drops_exactly_one(vars in vars_strategy(), seed in any::<usize>()) {
            prop_assume!(!vars.is_empty());
            let index = seed % vars.len();
            let removed = doc_with(vars.clone()).remove_variable(index).unwrap();
            let mut expected = vars.clone();
            expected.remove(index);
            prop_assert_eq!(removed.template.vars(), expected.as_slice());
        }
    }
}
