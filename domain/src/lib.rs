//! Domain layer for chatflow
//!
//! This crate contains the core chat entities and value objects: messages,
//! sessions, the capped conversation context sent to the completion endpoint,
//! and the stream events produced while a response is being decoded.
//! It has no dependencies on infrastructure or presentation concerns.

pub mod session;
pub mod util;

// Re-export commonly used types
pub use session::{
    context::{CONTEXT_LIMIT, ContextMessage, ContextWindow},
    entities::{DEFAULT_TITLE, Message, Role, Session},
    store::{SessionStore, StoreSnapshot, new_session_id},
    stream::StreamEvent,
};
pub use util::truncate_chars;
