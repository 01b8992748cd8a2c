//! Routing of user messages to the selected backend.
//!
//! A submission appends the user's turn, flattens the whole transcript into a
//! prompt, and appends exactly one generated turn. Backend failures become
//! the text of that generated turn so the conversation carries on.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::backend::Backend;
use crate::core::invoker::BackendInvoker;
use crate::core::message::{Conversation, Turn, REPLY_CUE};
use crate::core::store::{ConversationStore, StoreError};
use crate::utils::logging::LoggingState;

/// Rejected submission; nothing was appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoBackendSelected,
}

impl ValidationError {
    /// The single inline turn shown in place of the transcript.
    pub fn as_turn(&self) -> Turn {
        Turn::error(self.to_string())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoBackendSelected => write!(f, "Model choice is not selected."),
        }
    }
}

impl std::error::Error for ValidationError {}

pub struct ChatSession {
    store: ConversationStore,
    invoker: Box<dyn BackendInvoker>,
    selected: Option<Backend>,
    pub logging: LoggingState,
}

impl ChatSession {
    pub fn new(store: ConversationStore, invoker: Box<dyn BackendInvoker>) -> Self {
        Self {
            store,
            invoker,
            selected: None,
            logging: LoggingState::new(None),
        }
    }

    pub fn with_logging(mut self, logging: LoggingState) -> Self {
        self.logging = logging;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        self.store.conversation()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn selected(&self) -> Option<&Backend> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, backend: Option<Backend>) {
        debug!(backend = ?backend.as_ref().map(Backend::label), "Backend selected");
        self.selected = backend;
    }

    fn append(&mut self, turn: Turn) {
        if let Err(err) = self.logging.log_turn(&turn) {
            warn!(error = %err, "Failed to write transcript log");
        }
        self.store.append(turn);
    }

    /// Routes `message` to `backend` and returns the updated transcript.
    pub async fn submit(
        &mut self,
        message: &str,
        backend: Option<&Backend>,
    ) -> Result<&Conversation, ValidationError> {
        let backend = backend.ok_or(ValidationError::NoBackendSelected)?.clone();

        self.append(Turn::user(message));
        let prompt = self.store.conversation().render_prompt(REPLY_CUE);

        let reply = match self.invoker.invoke(&prompt, &backend).await {
            Ok(text) => text,
            Err(err) => {
                warn!(backend = %backend, error = %err, "Backend call failed");
                err.to_string()
            }
        };

        self.append(Turn::assistant(backend, reply));
        Ok(self.store.conversation())
    }

    /// [`Self::submit`] against the currently selected backend.
    pub async fn submit_selected(&mut self, message: &str) -> Result<&Conversation, ValidationError> {
        let backend = self.selected.clone();
        self.submit(message, backend.as_ref()).await
    }

    pub fn clear(&mut self) -> &Conversation {
        self.store.clear()
    }

    pub async fn save(&self, filename: Option<&Path>) -> Result<PathBuf, StoreError> {
        self.store.save(self.invoker.as_ref(), filename).await
    }

    pub async fn save_current(&self) -> Result<PathBuf, StoreError> {
        self.store.save_current(self.invoker.as_ref()).await
    }

    pub fn load(&mut self, filename: impl AsRef<Path>) -> Result<&Conversation, StoreError> {
        self.store.load(filename)
    }

    pub fn list_saved_files(&self) -> Result<Vec<String>, StoreError> {
        self.store.list_saved_files()
    }
}
