//! Compares configured local models against what the runtime has installed.

use std::fmt;
use std::io;

use crate::core::process::{ProcessManager, RUNTIME_PROGRAM};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub configured: Vec<String>,
    pub installed: Vec<String>,
    pub missing: Vec<String>,
}

impl StatusReport {
    pub fn all_installed(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn install_hint(model: &str) -> String {
    format!("{RUNTIME_PROGRAM} pull {model}")
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |items: &[String]| {
            if items.is_empty() {
                "(none)".to_string()
            } else {
                items.join(", ")
            }
        };
        writeln!(f, "Configured models: {}", list(&self.configured))?;
        write!(f, "Installed models: {}", list(&self.installed))?;
        if self.missing.is_empty() {
            write!(f, "\nAll configured models are installed.")
        } else {
            write!(f, "\nMissing models:")?;
            for model in &self.missing {
                write!(f, "\n  - {model} (install with: {})", install_hint(model))?;
            }
            Ok(())
        }
    }
}

/// Model names from `ollama list` output: first token per line, header skipped.
pub fn parse_installed(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| *name != "NAME")
        .map(str::to_string)
        .collect()
}

/// `llama3.2` is satisfied by `llama3.2:latest` or any other tag; a tagged
/// configured name must match exactly.
fn is_installed(configured: &str, installed: &[String]) -> bool {
    installed.iter().any(|name| {
        name == configured
            || (!configured.contains(':')
                && name
                    .split_once(':')
                    .is_some_and(|(base, _)| base == configured))
    })
}

pub fn check_status<S: AsRef<str>>(configured: &[S], listing: &str) -> StatusReport {
    let configured: Vec<String> = configured.iter().map(|m| m.as_ref().to_string()).collect();
    let installed = parse_installed(listing);
    let missing = configured
        .iter()
        .filter(|model| !is_installed(model, &installed))
        .cloned()
        .collect();
    StatusReport {
        configured,
        installed,
        missing,
    }
}

pub async fn status_from_system<S: AsRef<str>>(
    configured: &[S],
    processes: &dyn ProcessManager,
) -> io::Result<StatusReport> {
    let listing = processes.list_installed().await?;
    Ok(check_status(configured, &listing))
}
