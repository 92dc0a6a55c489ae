//! Conversation context window.
//!
//! The context window is the capped, timestamp-free view of the active
//! session's messages that is sent to the completion endpoint with each
//! request. It is a sliding window: once full, committing another exchange
//! drops the oldest entries.

use super::entities::{Message, Role};
use serde::{Deserialize, Serialize};

/// Maximum number of role/content pairs kept as request context.
pub const CONTEXT_LIMIT: usize = 20;

/// One entry of request context: role and content only, no timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: Role,
    pub content: String,
}

impl ContextMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for ContextMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Bounded, ordered list of context entries for the active session.
#[derive(Debug, Clone, Default)]
pub struct ContextWindow {
    entries: Vec<ContextMessage>,
}

impl ContextWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ContextMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a completed user/assistant exchange, then truncate to the most
    /// recent [`CONTEXT_LIMIT`] entries, dropping the oldest first.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.entries.push(ContextMessage::new(Role::User, user));
        self.entries
            .push(ContextMessage::new(Role::Assistant, assistant));
        self.truncate();
    }

    /// Rebuild the window from a session's message history, keeping only the
    /// most recent entries. Used when switching sessions.
    pub fn rebuild_from(&mut self, messages: &[Message]) {
        self.entries = messages.iter().map(ContextMessage::from).collect();
        self.truncate();
    }

    /// Drop everything. Used on session switch to a fresh session and on
    /// explicit clear.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn truncate(&mut self) {
        if self.entries.len() > CONTEXT_LIMIT {
            let excess = self.entries.len() - CONTEXT_LIMIT;
            self.entries.drain(..excess);
        }
    }
}
