//! User-facing notifications raised by editor actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: Option<String>,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: &str, description: Option<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description,
            at: Utc::now(),
        }
    }

    pub fn success(title: &str, description: &str) -> Self {
        Self::new(NotificationLevel::Success, title, Some(description.to_string()))
    }

    pub fn warning(title: &str, description: &str) -> Self {
        Self::new(NotificationLevel::Warning, title, Some(description.to_string()))
    }

    pub fn error(title: &str, description: Option<String>) -> Self {
        Self::new(NotificationLevel::Error, title, description)
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.description {
            Some(description) => write!(f, "[{}] {}: {}", self.level, self.title, description),
            None => write!(f, "[{}] {}", self.level, self.title),
        }
    }
}
