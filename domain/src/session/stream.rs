//! Streaming events for completion responses.
//!
//! [`StreamEvent`] bridges the infrastructure-level SSE decoding to the
//! application layer, enabling token-by-token display of model output.
//! Deltas carry both the increment and the running concatenation because
//! the transcript is updated in place with the cumulative text while the
//! increment is what the decoder actually received.

/// An event in a streaming completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model, plus the full response so far.
    Delta { chunk: String, full: String },
    /// The complete, whitespace-trimmed response text (signals stream end).
    Completed(String),
    /// An error that occurred during the request or while streaming.
    Error(String),
}

impl StreamEvent {
    /// Returns the incremental text for a `Delta`, or the final text for
    /// `Completed`.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta { chunk, .. } => Some(chunk),
            StreamEvent::Completed(s) => Some(s),
            StreamEvent::Error(_) => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}
