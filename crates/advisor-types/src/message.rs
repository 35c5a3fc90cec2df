//! Conversation message types.
//!
//! Messages are immutable once appended to a session. Their order is the
//! conversation order and is replayed verbatim into every prompt.

use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Visitor input
    User,
    /// Generated reply
    Assistant,
}

impl Role {
    /// Speaker label used when the conversation is serialized into a prompt.
    pub fn speaker_label(&self) -> &'static str {
        match self {
            Role::User => "고객",
            Role::Assistant => "상담원",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub role: Role,

    /// Message text (markdown for assistant replies)
    pub content: String,
}

impl Message {
    /// Create a message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a visitor message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// Render as a `speaker: content` transcript line.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role.speaker_label(), self.content)
    }
}
