//! State shared by the chat loop and the slash commands.

use std::path::PathBuf;

use crate::core::backend::Backend;
use crate::core::config::Config;
use crate::core::invoker::HttpInvoker;
use crate::core::process::{ProcessManager, SystemProcessManager};
use crate::core::session::ChatSession;
use crate::core::store::ConversationStore;
use crate::utils::logging::LoggingState;

pub struct App {
    pub session: ChatSession,
    pub processes: Box<dyn ProcessManager>,
    choices: Vec<Backend>,
    models: Vec<String>,
    notices: Vec<String>,
}

impl App {
    pub fn new(session: ChatSession, processes: Box<dyn ProcessManager>, models: Vec<String>) -> Self {
        Self {
            session,
            processes,
            choices: Backend::choices(&models),
            models,
            notices: Vec::new(),
        }
    }

    /// Production wiring: HTTP backends, the system process table, and a store
    /// rooted at `conversations_dir` (or the configured directory).
    pub fn from_config(
        config: &Config,
        conversations_dir: Option<PathBuf>,
        log_file: Option<String>,
    ) -> Self {
        let dir = conversations_dir.unwrap_or_else(|| config.conversations_dir());
        let store = ConversationStore::new(dir, config.summary_model.clone());
        let session = ChatSession::new(store, Box::new(HttpInvoker::from_config(config)))
            .with_logging(LoggingState::new(log_file));
        Self::new(session, Box::new(SystemProcessManager), config.models.clone())
    }

    /// Selector entries in display order.
    pub fn choices(&self) -> &[Backend] {
        &self.choices
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Parses and selects a selector label. Only offered entries are accepted.
    pub fn select_label(&mut self, label: &str) -> Result<Backend, String> {
        let backend = label.parse::<Backend>().map_err(|err| err.to_string())?;
        if !self.choices.contains(&backend) {
            return Err(format!(
                "'{backend}' is not a configured backend. Use /model to see the choices."
            ));
        }
        self.session.select(Some(backend.clone()));
        Ok(backend)
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    #[cfg(test)]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{create_test_app, FakeProcessManager};

    #[test]
    fn only_offered_backends_can_be_selected() {
        let (mut app, _dir) = create_test_app();

        assert_eq!(app.select_label("Ollama b"), Ok(Backend::local("b")));
        assert_eq!(app.session.selected(), Some(&Backend::local("b")));

        assert!(app.select_label("Ollama zzz").is_err());
        assert!(app.select_label("Ollama").is_err());
        assert_eq!(app.session.selected(), Some(&Backend::local("b")));

        assert_eq!(app.select_label("AzureOpen AI"), Ok(Backend::Cloud));
    }

    #[tokio::test]
    async fn every_offered_choice_survives_save_and_load() {
        let (app, _dir) = create_test_app();
        let models = vec!["llama 3".to_string(), String::new(), "a".to_string()];
        let mut app = App::new(app.session, Box::new(FakeProcessManager::default()), models);
        assert_eq!(app.choices(), [Backend::Cloud, Backend::local("a")]);

        let labels: Vec<String> = app.choices().iter().map(Backend::label).collect();
        for label in &labels {
            app.select_label(label).unwrap();
            app.session.submit_selected("hi").await.unwrap();
        }
        let saved = app.session.conversation().clone();
        app.session
            .save(Some(std::path::Path::new("x.json")))
            .await
            .unwrap();

        app.session.clear();
        assert_eq!(app.session.load("x.json").unwrap(), &saved);
    }

    #[test]
    fn notices_drain_once() {
        let (mut app, _dir) = create_test_app();
        app.notify("one");
        app.notify("two");
        assert_eq!(app.take_notices(), vec!["one", "two"]);
        assert!(app.take_notices().is_empty());
    }
}
