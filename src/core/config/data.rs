use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::backend::{validate_model_name, BackendParseError};

pub const DEFAULT_LOCAL_URL: &str = "http://localhost:11434";
pub const DEFAULT_SUMMARY_MODEL: &str = "llama3.2";
pub const DEFAULT_CLOUD_DEPLOYMENT: &str = "gpt4";
pub const DEFAULT_CLOUD_API_VERSION: &str = "2023-06-01-preview";

pub const ENV_CLOUD_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_CLOUD_API_KEY: &str = "AZURE_OPENAI_API_KEY";

fn default_models() -> Vec<String> {
    vec![DEFAULT_SUMMARY_MODEL.to_string()]
}

fn default_local_url() -> String {
    DEFAULT_LOCAL_URL.to_string()
}

fn default_summary_model() -> String {
    DEFAULT_SUMMARY_MODEL.to_string()
}

fn default_deployment() -> String {
    DEFAULT_CLOUD_DEPLOYMENT.to_string()
}

fn default_api_version() -> String {
    DEFAULT_CLOUD_API_VERSION.to_string()
}

/// Azure deployment settings. Credentials never live here; see [`CloudCredentials`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CloudSettings {
    #[serde(default = "default_deployment")]
    pub deployment: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            deployment: default_deployment(),
            api_version: default_api_version(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Local models offered in the selector and kept running at startup
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Base URL of the local Ollama runtime
    #[serde(default = "default_local_url")]
    pub local_url: String,
    /// Local model used to title auto-named saves
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    /// Where conversations are saved and listed (defaults to the working directory)
    pub conversations_dir: Option<PathBuf>,
    /// Selector label picked when the chat starts
    pub default_backend: Option<String>,
    #[serde(default)]
    pub cloud: CloudSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: default_models(),
            local_url: default_local_url(),
            summary_model: default_summary_model(),
            conversations_dir: None,
            default_backend: None,
            cloud: CloudSettings::default(),
        }
    }
}

impl Config {
    /// Appends `model` unless it is already listed. Names that could not be
    /// selected back from the model list are rejected.
    pub fn add_model(&mut self, model: &str) -> Result<bool, BackendParseError> {
        validate_model_name(model)?;
        if self.models.iter().any(|m| m == model) {
            return Ok(false);
        }
        self.models.push(model.to_string());
        Ok(true)
    }

    pub fn validate_models(&self) -> Result<(), BackendParseError> {
        self.models
            .iter()
            .try_for_each(|model| validate_model_name(model))
    }

    pub fn remove_model(&mut self, model: &str) -> bool {
        let before = self.models.len();
        self.models.retain(|m| m != model);
        self.models.len() != before
    }

    /// Directory saved conversations live in, falling back to `.`.
    pub fn conversations_dir(&self) -> PathBuf {
        self.conversations_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Endpoint and key for the cloud deployment, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudCredentials {
    pub endpoint: String,
    pub api_key: String,
}

impl CloudCredentials {
    /// Both variables must be set and non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let endpoint = lookup(ENV_CLOUD_ENDPOINT).filter(|v| !v.trim().is_empty())?;
        let api_key = lookup(ENV_CLOUD_API_KEY).filter(|v| !v.trim().is_empty())?;
        Some(Self { endpoint, api_key })
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
