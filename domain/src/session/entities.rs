//! Session domain entities

use crate::util::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to a session before its first exchange.
pub const DEFAULT_TITLE: &str = "New chat";

/// Maximum number of characters taken from the first user message
/// when deriving a session title.
const TITLE_CHARS: usize = 20;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message in a conversation (Entity)
///
/// Immutable once created; sessions only ever append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One persisted conversation thread (Entity)
///
/// A session owns an ordered message history and a display title. It is
/// mutated only by appending exchanges; messages are never edited or
/// removed individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: String,
    title: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a completed user/assistant exchange.
    ///
    /// The title is derived from the first user message (truncated to
    /// [`TITLE_CHARS`] characters plus an ellipsis) and never changes
    /// afterwards. `updated_at` is bumped on every commit.
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        let user = user.into();

        if self.title == DEFAULT_TITLE && !user.is_empty() {
            self.title = derive_title(&user);
        }

        self.messages.push(Message::user(user));
        self.messages.push(Message::assistant(assistant));
        self.updated_at = Utc::now();
    }
}

/// Derive a session title from the first user message.
fn derive_title(user_message: &str) -> String {
    let head = truncate_chars(user_message, TITLE_CHARS);
    if head.len() < user_message.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}
