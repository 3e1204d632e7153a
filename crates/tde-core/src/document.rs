//! Template document data model
//!
//! A template document is the JSON object `{"template": {...}}` stored in the
//! content database. Keys this model does not know about are kept in `extra`
//! maps so a document survives load/export unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;

/// One extraction template, as loaded from or sent to the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    /// URI the document was loaded from. Empty for an unsaved template.
    /// Not part of the stored body.
    #[serde(skip)]
    pub uri: String,
    pub template: Template,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TemplateDocument {
    fn default() -> Self {
        Self {
            uri: String::new(),
            template: Template {
                context: Some(String::new()),
                collections: Some(Vec::new()),
                directories: Some(Vec::new()),
                ..Template::default()
            },
            extra: Map::new(),
        }
    }
}

impl TemplateDocument {
    /// Create an empty, unsaved document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document body and remember where it came from
    pub fn from_json_with_uri(json: &str, uri: &str) -> Result<Self, ModelError> {
        let mut doc = Self::from_json(json)?;
        doc.uri = uri.to_string();
        Ok(doc)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::ParseError(e.to_string()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        serde_json::from_slice(bytes).map_err(|e| ModelError::ParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(|e| ModelError::SerializationError(e.to_string()))
    }

    /// Two-space indented JSON, the format used for exported files
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ModelError::SerializationError(e.to_string()))
    }
}

/// The body of a template document.
///
/// Array fields are `None` when the stored document omits them; readers treat
/// that as empty and the first mutation materializes the array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Vec<Variable>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<ViewRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triples: Option<Vec<Triple>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Template {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn context(&self) -> &str {
        self.context.as_deref().unwrap_or_default()
    }

    pub fn collections(&self) -> &[String] {
        self.collections.as_deref().unwrap_or_default()
    }

    pub fn directories(&self) -> &[String] {
        self.directories.as_deref().unwrap_or_default()
    }

    pub fn vars(&self) -> &[Variable] {
        self.vars.as_deref().unwrap_or_default()
    }

    pub fn rows(&self) -> &[ViewRow] {
        self.rows.as_deref().unwrap_or_default()
    }

    pub fn triples(&self) -> &[Triple] {
        self.triples.as_deref().unwrap_or_default()
    }
}

/// A named expression evaluated in the template context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub val: String,
}

impl Variable {
    pub fn new(name: &str, val: &str) -> Self {
        Self {
            name: name.to_string(),
            val: val.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLayout {
    #[default]
    Sparse,
    Dense,
}

/// One row specification of the tabular extraction layout.
///
/// Only the layout is interpreted here; schema, view and column definitions
/// travel untouched in `fields`. A row stored without `viewLayout` is
/// exported without one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_layout: Option<ViewLayout>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ViewRow {
    /// A fresh row with an explicit sparse layout and nothing else
    pub fn new() -> Self {
        Self {
            view_layout: Some(ViewLayout::Sparse),
            fields: Map::new(),
        }
    }

    /// Effective layout; sparse when the row does not say
    pub fn layout(&self) -> ViewLayout {
        self.view_layout.unwrap_or_default()
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.fields.get("schemaName").and_then(Value::as_str)
    }

    pub fn view_name(&self) -> Option<&str> {
        self.fields.get("viewName").and_then(Value::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.fields
            .get("columns")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// Subject, predicate or object of a triple rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripleTerm {
    pub val: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TripleTerm {
    pub fn new(val: &str) -> Self {
        Self {
            val: val.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: TripleTerm,
    pub predicate: TripleTerm,
    pub object: TripleTerm,
}

impl Triple {
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: TripleTerm::new(subject),
            predicate: TripleTerm::new(predicate),
            object: TripleTerm::new(object),
        }
    }
}
