//! Infrastructure layer for chatflow
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the OpenAI-compatible streaming gateway, the JSON
//! file history store, and configuration file loading.

pub mod config;
pub mod openai;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigLoader, FileApiConfig, FileChatConfig, FileConfig, FileStorageConfig};
pub use openai::{gateway::OpenAiGateway, sse::SseDecoder};
pub use storage::JsonHistoryStore;
