//! In-memory transcript plus its JSON snapshots on disk.
//!
//! A snapshot is a JSON array of `[speaker, message]` pairs. Auto-named saves
//! are titled by the summarization model and stamped with local time, e.g.
//! `Rust Borrow Checker - 20261014093012.json`.

use chrono::Local;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::core::backend::Backend;
use crate::core::invoker::BackendInvoker;
use crate::core::message::{Conversation, Turn};

pub const CONVERSATION_EXTENSION: &str = "json";
pub const FALLBACK_TITLE: &str = "Conversation";

const TITLE_INSTRUCTION: &str = "Generate a very simple and meaningful name for this conversation. Maximum 3 words. Do not include anything else in the response.";
const TITLE_MAX_WORDS: usize = 3;

#[derive(Debug)]
pub enum StoreError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    List {
        dir: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Read { path, source } => {
                write!(f, "Failed to read conversation {}: {}", path.display(), source)
            }
            StoreError::Parse { path, source } => {
                write!(f, "Failed to parse conversation {}: {}", path.display(), source)
            }
            StoreError::Write { path, source } => {
                write!(f, "Failed to save conversation {}: {}", path.display(), source)
            }
            StoreError::List { dir, source } => {
                write!(f, "Failed to list conversations in {}: {}", dir.display(), source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Read { source, .. }
            | StoreError::Write { source, .. }
            | StoreError::List { source, .. } => Some(source),
            StoreError::Parse { source, .. } => Some(source),
        }
    }
}

/// Makes a model-produced title safe to use as a file stem.
pub fn sanitize_title(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    let title = cleaned
        .split_whitespace()
        .take(TITLE_MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    let title = title.trim_matches(|c: char| c == '.' || c == '\'' || c.is_whitespace());
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title.to_string()
    }
}

pub fn auto_filename(title: &str, stamp: chrono::DateTime<Local>) -> String {
    format!(
        "{} - {}.{CONVERSATION_EXTENSION}",
        sanitize_title(title),
        stamp.format("%Y%m%d%H%M%S")
    )
}

pub struct ConversationStore {
    conversation: Conversation,
    loaded_file: Option<PathBuf>,
    dir: PathBuf,
    summary_model: String,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>, summary_model: impl Into<String>) -> Self {
        Self {
            conversation: Conversation::new(),
            loaded_file: None,
            dir: dir.into(),
            summary_model: summary_model.into(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File most recently loaded, used as the target of [`Self::save_current`].
    pub fn loaded_file(&self) -> Option<&Path> {
        self.loaded_file.as_deref()
    }

    pub fn append(&mut self, turn: Turn) {
        self.conversation.push(turn);
    }

    pub fn clear(&mut self) -> &Conversation {
        self.conversation.clear();
        &self.conversation
    }

    fn resolve(&self, filename: &Path) -> PathBuf {
        if filename.is_absolute() {
            filename.to_path_buf()
        } else {
            self.dir.join(filename)
        }
    }

    /// Asks the summarization model for a short title; a failed or blank
    /// reply falls back to [`FALLBACK_TITLE`].
    pub async fn generate_title(&self, invoker: &dyn BackendInvoker) -> String {
        let prompt = self.conversation.render_prompt(TITLE_INSTRUCTION);
        let backend = Backend::local(self.summary_model.as_str());
        match invoker.invoke(&prompt, &backend).await {
            Ok(title) => sanitize_title(title.trim()),
            Err(err) => {
                warn!(error = %err, "Title generation failed; using fallback name");
                FALLBACK_TITLE.to_string()
            }
        }
    }

    /// Writes the whole transcript. Without a filename one is derived from a
    /// generated title and the current timestamp. Returns the written path;
    /// the conversation itself is untouched.
    pub async fn save(
        &self,
        invoker: &dyn BackendInvoker,
        filename: Option<&Path>,
    ) -> Result<PathBuf, StoreError> {
        let path = match filename {
            Some(name) => self.resolve(name),
            None => {
                let title = self.generate_title(invoker).await;
                self.dir.join(auto_filename(&title, Local::now()))
            }
        };
        self.write_to(&path)?;
        info!(path = %path.display(), turns = self.conversation.len(), "Saved conversation");
        Ok(path)
    }

    /// Saves over the loaded file when there is one, otherwise auto-names.
    pub async fn save_current(&self, invoker: &dyn BackendInvoker) -> Result<PathBuf, StoreError> {
        let loaded = self.loaded_file.clone();
        self.save(invoker, loaded.as_deref()).await
    }

    fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        let contents = serde_json::to_vec(&self.conversation)
            .map_err(|err| write_err(std::io::Error::other(err)))?;

        let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new_in("."),
        }
        .map_err(write_err)?;
        temp_file.write_all(&contents).map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(path)
            .map_err(|err| write_err(err.error))?;
        Ok(())
    }

    /// Replaces the in-memory transcript with the file's turns. On failure the
    /// current transcript is kept as is.
    pub fn load(&mut self, filename: impl AsRef<Path>) -> Result<&Conversation, StoreError> {
        let path = self.resolve(filename.as_ref());
        let contents = fs::read(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let conversation: Conversation =
            serde_json::from_slice(&contents).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), turns = conversation.len(), "Loaded conversation");
        self.conversation = conversation;
        self.loaded_file = Some(path);
        Ok(&self.conversation)
    }

    /// Saved conversation filenames in the store directory, sorted.
    pub fn list_saved_files(&self) -> Result<Vec<String>, StoreError> {
        let list_err = |source| StoreError::List {
            dir: self.dir.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let path = entry.path();
            let is_conversation = path
                .extension()
                .is_some_and(|ext| ext == CONVERSATION_EXTENSION);
            if !is_conversation || !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
