//! Application layer for chatflow
//!
//! This crate contains the chat controller use case and the port definitions
//! it depends on. It depends only on the domain layer; adapters for the
//! ports live in the infrastructure and presentation layers.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    completion_gateway::{CompletionGateway, CompletionRequest, GatewayError, StreamHandle},
    history_store::{HistoryStore, NullHistoryStore, StorageError},
    render_sink::{NoRenderSink, RenderSink, SessionSummary, TranscriptEntry},
};
pub use use_cases::chat_controller::{APOLOGY_MESSAGE, ChatController, SendError};
