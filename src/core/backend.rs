//! Backend selection.
//!
//! A [`Backend`] is resolved once, when the user picks an entry from the
//! model selector, so routing never has to re-parse a display label.

use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Selector label for the cloud deployment.
pub const CLOUD_LABEL: &str = "AzureOpen AI";

/// Prefix shared by every local runtime entry in the selector.
pub const LOCAL_PREFIX: &str = "Ollama";

/// A local model name as configured (e.g. `llama3.2`).
pub type ModelSpec = String;

/// A model name must be a single non-empty token so its label parses back.
pub fn validate_model_name(model: &str) -> Result<(), BackendParseError> {
    if model.is_empty() {
        return Err(BackendParseError::MissingModel);
    }
    if model.chars().any(char::is_whitespace) {
        return Err(BackendParseError::InvalidModel(model.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Backend {
    /// The Azure OpenAI chat-completion deployment.
    Cloud,
    /// A model served by the local Ollama runtime.
    Local { model: ModelSpec },
}

impl Backend {
    pub fn local(model: impl Into<ModelSpec>) -> Self {
        Backend::Local {
            model: model.into(),
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, Backend::Cloud)
    }

    /// Underlying local model name, `None` for the cloud backend.
    pub fn model_name(&self) -> Option<&str> {
        match self {
            Backend::Cloud => None,
            Backend::Local { model } => Some(model),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Backend::Cloud => CLOUD_LABEL.to_string(),
            Backend::Local { model } => format!("{LOCAL_PREFIX} {model}"),
        }
    }

    /// Selector entries: the cloud backend first, then one per configured
    /// model. Names that could not be selected again are skipped.
    pub fn choices<S: AsRef<str>>(models: &[S]) -> Vec<Backend> {
        let locals = models.iter().filter_map(|model| {
            let model = model.as_ref();
            match validate_model_name(model) {
                Ok(()) => Some(Backend::local(model)),
                Err(err) => {
                    warn!(model, error = %err, "Skipping unusable model name");
                    None
                }
            }
        });
        std::iter::once(Backend::Cloud).chain(locals).collect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Rejected selector label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendParseError {
    Empty,
    MissingModel,
    ExtraTokens(String),
    UnknownBackend(String),
    InvalidModel(String),
}

impl fmt::Display for BackendParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendParseError::Empty => write!(f, "No backend given"),
            BackendParseError::MissingModel => {
                write!(f, "Expected a model name after '{LOCAL_PREFIX}'")
            }
            BackendParseError::ExtraTokens(label) => write!(
                f,
                "Backend '{label}' has too many parts; expected '{LOCAL_PREFIX} <model>'"
            ),
            BackendParseError::UnknownBackend(label) => write!(
                f,
                "Unknown backend '{label}'; expected '{CLOUD_LABEL}' or '{LOCAL_PREFIX} <model>'"
            ),
            BackendParseError::InvalidModel(model) => {
                write!(f, "Model name '{model}' must not contain whitespace")
            }
        }
    }
}

impl std::error::Error for BackendParseError {}

impl FromStr for Backend {
    type Err = BackendParseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(BackendParseError::Empty);
        }
        if trimmed == CLOUD_LABEL {
            return Ok(Backend::Cloud);
        }

        let mut tokens = trimmed.split_whitespace();
        match tokens.next() {
            Some(prefix) if prefix == LOCAL_PREFIX => {}
            _ => return Err(BackendParseError::UnknownBackend(trimmed.to_string())),
        }
        let Some(model) = tokens.next() else {
            return Err(BackendParseError::MissingModel);
        };
        if tokens.next().is_some() {
            return Err(BackendParseError::ExtraTokens(trimmed.to_string()));
        }
        Ok(Backend::local(model))
    }
}
