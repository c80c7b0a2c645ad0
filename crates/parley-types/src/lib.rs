//! Shared types for the Parley voice backend.
//!
//! This crate holds the data model exchanged between the pipeline and the
//! HTTP layer: conversation turns kept in session history, the
//! success-shaped [`PipelineResult`] and the error-shaped
//! [`StructuredError`] returned to callers.
//!
//! Nothing here performs I/O. Every other crate in the workspace depends on
//! `parley-types` for these definitions so the HTTP surface and the
//! orchestrator agree on field names.

pub mod result;

pub use result::{ErrorKind, PipelineResult, StructuredError};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human speaking into the microphone.
    User,
    /// The language model's reply.
    Assistant,
}

impl Role {
    /// Returns the wire label for this role (`"user"` / `"assistant"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Returns the capitalised label used when rendering a transcript prompt.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged utterance in a session's history.
///
/// Turns are immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Renders the turn as a `"<Role>: <content>"` transcript line.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}

/// Joins turns into the newline-separated transcript sent to the language model.
pub fn render_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(ConversationTurn::transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let turn = ConversationTurn::assistant("hello there");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hello there");
    }

    #[test]
    fn transcript_uses_capitalised_roles_one_per_line() {
        let turns = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("Hello! How can I help?"),
            ConversationTurn::user("bye"),
        ];
        assert_eq!(
            render_transcript(&turns),
            "User: hi\nAssistant: Hello! How can I help?\nUser: bye"
        );
    }

    #[test]
    fn empty_transcript_is_empty_string() {
        assert_eq!(render_transcript(&[]), "");
    }
}
