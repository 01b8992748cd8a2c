use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::backend::Backend;

const USER_LABEL: &str = "User";
const ERROR_LABEL: &str = "Error";
const ASSISTANT_PREFIX: &str = "AI (";

/// Cue appended after the transcript when a generated reply is expected.
pub const REPLY_CUE: &str = "AI:";

/// Who produced a turn. Persisted as its display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Speaker {
    User,
    /// A generated reply, tagged with the backend that produced it.
    Assistant(Backend),
    /// App-authored error shown inline but never stored by routing.
    Error,
}

impl Speaker {
    pub fn label(&self) -> String {
        match self {
            Speaker::User => USER_LABEL.to_string(),
            Speaker::Assistant(backend) => format!("{ASSISTANT_PREFIX}{backend})"),
            Speaker::Error => ERROR_LABEL.to_string(),
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Speaker::User)
    }

    pub fn backend(&self) -> Option<&Backend> {
        match self {
            Speaker::Assistant(backend) => Some(backend),
            _ => None,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl TryFrom<&str> for Speaker {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, String> {
        match value {
            USER_LABEL => Ok(Speaker::User),
            ERROR_LABEL => Ok(Speaker::Error),
            _ => value
                .strip_prefix(ASSISTANT_PREFIX)
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| format!("invalid speaker label: {value}"))?
                .parse::<Backend>()
                .map(Speaker::Assistant)
                .map_err(|err| format!("invalid speaker label '{value}': {err}")),
        }
    }
}

impl TryFrom<String> for Speaker {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        Self::try_from(value.as_str())
    }
}

impl From<Speaker> for String {
    fn from(value: Speaker) -> Self {
        value.label()
    }
}

/// One `(speaker, message)` entry; serialized as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Speaker, String)", into = "(Speaker, String)")]
pub struct Turn {
    pub speaker: Speaker,
    pub message: String,
}

impl Turn {
    pub fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(Speaker::User, message)
    }

    pub fn assistant(backend: Backend, message: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant(backend), message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Speaker::Error, message)
    }
}

impl From<(Speaker, String)> for Turn {
    fn from((speaker, message): (Speaker, String)) -> Self {
        Self { speaker, message }
    }
}

impl From<Turn> for (Speaker, String) {
    fn from(turn: Turn) -> Self {
        (turn.speaker, turn.message)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.message)
    }
}

/// The ordered transcript of the active session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Flattens the transcript into `speaker: message` lines followed by `cue`.
    pub fn render_prompt(&self, cue: &str) -> String {
        let mut prompt = self
            .turns
            .iter()
            .map(Turn::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        prompt.push('\n');
        prompt.push_str(cue);
        prompt
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_label_embeds_backend() {
        let speaker = Speaker::Assistant(Backend::local("llama3.2"));
        assert_eq!(speaker.label(), "AI (Ollama llama3.2)");
        assert_eq!(
            Speaker::Assistant(Backend::Cloud).label(),
            "AI (AzureOpen AI)"
        );
    }

    #[test]
    fn speaker_labels_parse() {
        assert_eq!(Speaker::try_from("User"), Ok(Speaker::User));
        assert_eq!(Speaker::try_from("Error"), Ok(Speaker::Error));
        assert_eq!(
            Speaker::try_from("AI (Ollama mistral)"),
            Ok(Speaker::Assistant(Backend::local("mistral")))
        );
        assert!(Speaker::try_from("Narrator").is_err());
        assert!(Speaker::try_from("AI (Ollama)").is_err());
    }

    #[test]
    fn turns_serialize_as_pairs() {
        let conversation = Conversation::from(vec![
            Turn::user("hi"),
            Turn::assistant(Backend::local("llama3.2"), "hello"),
        ]);
        let json = serde_json::to_string(&conversation).unwrap();
        assert_eq!(json, r#"[["User","hi"],["AI (Ollama llama3.2)","hello"]]"#);
    }

    #[test]
    fn prompt_lists_every_turn_then_the_cue() {
        let conversation = Conversation::from(vec![
            Turn::user("What is Rust?"),
            Turn::assistant(Backend::Cloud, "A language."),
            Turn::user("Thanks"),
        ]);
        assert_eq!(
            conversation.render_prompt(REPLY_CUE),
            "User: What is Rust?\nAI (AzureOpen AI): A language.\nUser: Thanks\nAI:"
        );
    }

    #[test]
    fn empty_conversation_renders_only_the_cue() {
        assert_eq!(Conversation::new().render_prompt(REPLY_CUE), "\nAI:");
    }
}
