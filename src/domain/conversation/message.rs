//! Message entity for the analysis conversation.
//!
//! Messages are immutable once terminal. The single loading message is the
//! only one whose agent log may grow, and only through the conversation
//! reducer.

use crate::domain::foundation::{MessageId, Timestamp};
use serde::{Deserialize, Serialize};

/// Content shown while an analysis is running.
pub const LOADING_CONTENT: &str = "Analyzing...";

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System notices.
    System,
    /// User input.
    User,
    /// Analysis service output.
    Assistant,
}

/// A message within a conversation.
///
/// # Invariants
///
/// - `id` is unique and ordered by creation
/// - `agent_logs` is `Some` only while `is_loading` is true
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    created_at: Timestamp,
    is_loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent_logs: Option<Vec<String>>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            created_at: Timestamp::now(),
            is_loading: false,
            agent_logs: None,
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a terminal assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates the assistant placeholder shown while an analysis runs.
    pub fn loading_placeholder() -> Self {
        Self {
            is_loading: true,
            agent_logs: Some(Vec::new()),
            ..Self::new(Role::Assistant, LOADING_CONTENT)
        }
    }

    /// Returns a copy of this loading message with one more log line.
    pub(crate) fn with_log(&self, line: impl Into<String>) -> Self {
        let mut logs = self.agent_logs.clone().unwrap_or_default();
        logs.push(line.into());
        Self {
            agent_logs: Some(logs),
            ..self.clone()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the message ID.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true for the in-flight placeholder.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Agent log lines in arrival order (loading message only).
    pub fn agent_logs(&self) -> Option<&[String]> {
        self.agent_logs.as_deref()
    }

    /// Returns true if this message is from the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if this message is from the assistant.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
