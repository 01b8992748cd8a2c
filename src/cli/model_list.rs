//! Listing commands: backends, saved conversations, and runtime status.

use std::error::Error;
use std::path::PathBuf;

use crate::core::backend::Backend;
use crate::core::config::{CloudCredentials, Config};
use crate::core::process::SystemProcessManager;
use crate::core::status::status_from_system;
use crate::core::store::ConversationStore;

pub fn list_backends(config: &Config) {
    let cloud_ready = CloudCredentials::from_env().is_some();
    println!("🤖 Available backends");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for backend in Backend::choices(&config.models) {
        let is_default = config.default_backend.as_deref() == Some(backend.label().as_str());
        let mut line = format!("  • {backend}");
        if backend.is_cloud() && !cloud_ready {
            line.push_str("  (credentials not set)");
        }
        if is_default {
            line.push_str("  (default)");
        }
        println!("{line}");
    }
}

pub fn list_saved(config: &Config, dir: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let dir = dir.unwrap_or_else(|| config.conversations_dir());
    let store = ConversationStore::new(&dir, config.summary_model.clone());
    let files = store.list_saved_files()?;
    if files.is_empty() {
        println!("No saved conversations in {}.", dir.display());
    } else {
        for name in files {
            println!("{name}");
        }
    }
    Ok(())
}

pub async fn print_status(config: &Config) -> Result<(), Box<dyn Error>> {
    let report = status_from_system(&config.models, &SystemProcessManager).await?;
    println!("{report}");
    Ok(())
}
