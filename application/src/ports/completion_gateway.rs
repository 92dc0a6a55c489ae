//! Completion gateway port
//!
//! Defines the interface for streaming chat completions from a remote
//! endpoint.

use async_trait::async_trait;
use chatflow_domain::{ContextMessage, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// One streaming completion request.
///
/// `messages` is the capped conversation context plus the newly submitted
/// user message. Generation parameters are fixed per request; the adapter
/// always enables streaming on the wire.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ContextMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ContextMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Gateway for streaming chat completions
///
/// This port defines how the application layer talks to the completion
/// endpoint. Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Start a streaming completion. Returns a handle whose channel yields
    /// delta events followed by exactly one terminal event.
    ///
    /// A non-2xx response or transport failure is reported here; errors that
    /// occur mid-stream arrive as [`StreamEvent::Error`] on the handle.
    async fn stream_chat(&self, request: CompletionRequest) -> Result<StreamHandle, GatewayError>;
}

/// Handle for receiving streaming events from a completion request.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect the final text.
    ///
    /// Useful when streaming display is not needed and only the completed
    /// response matters.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta { full, .. } => full_text = full,
                StreamEvent::Completed(text) => return Ok(text),
                StreamEvent::Error(e) => return Err(GatewayError::Stream(e)),
            }
        }
        // Channel closed without Completed: return what we have
        Ok(full_text.trim().to_string())
    }
}
