//! `set` / `unset` handling for configuration keys.

use std::fmt;
use std::path::PathBuf;

use crate::core::backend::Backend;
use crate::core::config::data::{Config, DEFAULT_LOCAL_URL, DEFAULT_SUMMARY_MODEL};

pub const KEYS: &[&str] = &[
    "models",
    "local-url",
    "summary-model",
    "conversations-dir",
    "default-backend",
];

#[derive(Debug, PartialEq, Eq)]
pub enum SettingsError {
    UnknownKey(String),
    MissingValue(&'static str),
    InvalidValue { key: &'static str, reason: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnknownKey(key) => {
                write!(f, "Unknown config key: {key}. Known keys: {}", KEYS.join(", "))
            }
            SettingsError::MissingValue(key) => write!(f, "A value is required for {key}"),
            SettingsError::InvalidValue { key, reason } => {
                write!(f, "Invalid value for {key}: {reason}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

fn single(key: &'static str, value: &[String]) -> Result<String, SettingsError> {
    let joined = value.join(" ");
    if joined.trim().is_empty() {
        return Err(SettingsError::MissingValue(key));
    }
    Ok(joined.trim().to_string())
}

pub fn set_value(config: &mut Config, key: &str, value: &[String]) -> Result<String, SettingsError> {
    match key {
        "models" => {
            if value.is_empty() {
                return Err(SettingsError::MissingValue("models"));
            }
            let mut updated = config.clone();
            updated.models.clear();
            for model in value {
                updated
                    .add_model(model)
                    .map_err(|err| SettingsError::InvalidValue {
                        key: "models",
                        reason: err.to_string(),
                    })?;
            }
            config.models = updated.models;
            Ok(format!("Set models to: {}", config.models.join(", ")))
        }
        "local-url" => {
            config.local_url = single("local-url", value)?;
            Ok(format!("Set local-url to: {}", config.local_url))
        }
        "summary-model" => {
            config.summary_model = single("summary-model", value)?;
            Ok(format!("Set summary-model to: {}", config.summary_model))
        }
        "conversations-dir" => {
            let dir = PathBuf::from(single("conversations-dir", value)?);
            let message = format!("Set conversations-dir to: {}", dir.display());
            config.conversations_dir = Some(dir);
            Ok(message)
        }
        "default-backend" => {
            let label = single("default-backend", value)?;
            let backend = label
                .parse::<Backend>()
                .map_err(|err| SettingsError::InvalidValue {
                    key: "default-backend",
                    reason: err.to_string(),
                })?;
            let message = format!("Set default-backend to: {backend}");
            config.default_backend = Some(backend.label());
            Ok(message)
        }
        _ => Err(SettingsError::UnknownKey(key.to_string())),
    }
}

pub fn unset_value(config: &mut Config, key: &str) -> Result<String, SettingsError> {
    let defaults = Config::default();
    match key {
        "models" => config.models = defaults.models,
        "local-url" => config.local_url = DEFAULT_LOCAL_URL.to_string(),
        "summary-model" => config.summary_model = DEFAULT_SUMMARY_MODEL.to_string(),
        "conversations-dir" => config.conversations_dir = None,
        "default-backend" => config.default_backend = None,
        _ => return Err(SettingsError::UnknownKey(key.to_string())),
    }
    Ok(format!("Unset {key}"))
}
