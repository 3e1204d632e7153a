//! Editor configuration
//!
//! Loaded from a TOML file; every section has defaults so an empty file (or
//! no file at all) is valid. Environment variables override file values.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `gateway.base_url`
pub const ENV_BASE_URL: &str = "TDE_BASE_URL";
/// Environment variable overriding `gateway.username`
pub const ENV_USERNAME: &str = "TDE_USERNAME";
/// Environment variable overriding `gateway.password`
pub const ENV_PASSWORD: &str = "TDE_PASSWORD";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub editor: EditorSettings,
}

impl EditorConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Override values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override values using `lookup` in place of the environment
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.gateway.base_url = url;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.gateway.username = username;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.gateway.password = password;
        }
    }
}

/// Connection settings for the template service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the middle tier serving `/api/...` (default: http://localhost:4001)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Basic-auth user sent with every request (default: admin)
    #[serde(default = "default_credential")]
    pub username: String,
    /// Basic-auth password (default: admin)
    #[serde(default = "default_credential")]
    pub password: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:4001".to_string()
}

fn default_credential() -> String {
    "admin".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_credential(),
            password: default_credential(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// What selecting another template does to unsaved edits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsavedEditsPolicy {
    /// Replace the open document; edits are lost
    #[default]
    Discard,
    /// Keep the open document and report `WorkflowError::UnsavedEdits`
    Refuse,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub unsaved_edits: UnsavedEditsPolicy,
}
