use crate::core::message::Turn;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Plain-text mirror of the transcript, toggled with `/log`.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    /// A file given on the command line starts logging immediately.
    pub fn new(log_file: Option<String>) -> Self {
        let is_active = log_file.is_some();
        LoggingState {
            file_path: log_file,
            is_active,
        }
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {path}"))
                } else {
                    Ok(format!("Logging paused (file: {path})"))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    pub fn log_turn(&self, turn: &Turn) -> Result<(), Box<dyn std::error::Error>> {
        self.log_message(&turn.to_string())
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between turns, matching the on-screen layout.
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        let file_name = |path: &str| {
            Path::new(path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::Backend;
    use tempfile::TempDir;

    #[test]
    fn logs_turns_with_blank_separator_while_active() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log").to_string_lossy().into_owned();
        let mut logging = LoggingState::new(None);
        assert_eq!(logging.get_status_string(), "disabled");

        logging.set_log_file(path.clone()).unwrap();
        logging.log_turn(&Turn::user("hi")).unwrap();
        logging
            .log_turn(&Turn::assistant(Backend::local("llama3.2"), "line one\nline two"))
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "User: hi\n\nAI (Ollama llama3.2): line one\nline two\n\n"
        );
        assert_eq!(logging.get_status_string(), "active (chat.log)");
    }

    #[test]
    fn paused_logging_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log").to_string_lossy().into_owned();
        let mut logging = LoggingState::new(Some(path.clone()));
        assert!(logging.is_active());

        let message = logging.toggle_logging().unwrap();
        assert!(message.starts_with("Logging paused"));
        logging.log_turn(&Turn::user("ignored")).unwrap();
        assert!(!Path::new(&path).exists());
        assert_eq!(logging.get_status_string(), "paused (chat.log)");
    }

    #[test]
    fn toggle_without_file_is_an_error() {
        let mut logging = LoggingState::new(None);
        assert!(logging.toggle_logging().is_err());
    }
}
