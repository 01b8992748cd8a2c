//! Keeps the local model runtimes alive.
//!
//! The startup pass is fire-and-forget: a runtime that had to be launched may
//! still be loading when the first message arrives, and that request simply
//! fails like any other unavailable backend.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

use crate::core::backend::ModelSpec;

pub const RUNTIME_PROGRAM: &str = "ollama";

/// Narrow view of the host's process table.
#[async_trait]
pub trait ProcessManager: Send + Sync {
    /// Whether any process command line matches `pattern`.
    async fn is_running(&self, pattern: &str) -> io::Result<bool>;

    /// Launches `program` detached; does not wait for it to become ready.
    async fn start(&self, program: &str, args: &[&str]) -> io::Result<()>;

    /// Raw output of the runtime's installed-model listing.
    async fn list_installed(&self) -> io::Result<String>;
}

/// Process manager backed by `pgrep` and the `ollama` CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessManager;

#[async_trait]
impl ProcessManager for SystemProcessManager {
    async fn is_running(&self, pattern: &str) -> io::Result<bool> {
        let status = Command::new("pgrep")
            .arg("-f")
            .arg(pattern)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;
        // pgrep exits 1 when nothing matched; anything else is a real failure.
        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(io::Error::other(format!("pgrep failed: {status}"))),
        }
    }

    async fn start(&self, program: &str, args: &[&str]) -> io::Result<()> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
    }

    async fn list_installed(&self) -> io::Result<String> {
        let output = Command::new(RUNTIME_PROGRAM).arg("list").output().await?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{RUNTIME_PROGRAM} list failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Command-line signature of a runtime serving `model`.
pub fn runtime_signature(model: &str) -> String {
    format!("{RUNTIME_PROGRAM} run {model}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupAction {
    AlreadyRunning(ModelSpec),
    Started(ModelSpec),
    Failed { model: ModelSpec, reason: String },
}

/// Starts a runtime for every configured model that isn't already running.
pub async fn ensure_running<S: AsRef<str>>(
    models: &[S],
    processes: &dyn ProcessManager,
) -> Vec<StartupAction> {
    let mut actions = Vec::with_capacity(models.len());
    for model in models {
        actions.push(ensure_model_running(model.as_ref(), processes).await);
    }
    actions
}

async fn ensure_model_running(model: &str, processes: &dyn ProcessManager) -> StartupAction {
    let signature = runtime_signature(model);
    match processes.is_running(&signature).await {
        Ok(true) => {
            info!(model, "Runtime already running");
            return StartupAction::AlreadyRunning(model.to_string());
        }
        Ok(false) => {}
        Err(err) => {
            warn!(model, error = %err, "Could not query process table");
            return StartupAction::Failed {
                model: model.to_string(),
                reason: err.to_string(),
            };
        }
    }

    info!(command = %signature, "Starting runtime");
    match processes.start(RUNTIME_PROGRAM, &["run", model]).await {
        Ok(()) => StartupAction::Started(model.to_string()),
        Err(err) => {
            warn!(model, error = %err, "Failed to start runtime");
            StartupAction::Failed {
                model: model.to_string(),
                reason: err.to_string(),
            }
        }
    }
}
