//! Render sink port
//!
//! The UI-facing boundary: everything the chat controller needs to show a
//! transcript, a pending indicator, and the session history list. The core
//! never touches a UI toolkit directly: implementations live in the
//! presentation layer.

use chatflow_domain::{Role, Session};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle to one streaming transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptEntry(u64);

impl TranscriptEntry {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What the history list shows for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            title: session.title().to_string(),
            updated_at: session.updated_at(),
        }
    }
}

/// UI boundary consumed by the chat controller.
///
/// Streaming entries are updated in place with cumulative text via
/// [`update_streaming`](RenderSink::update_streaming) and sealed with
/// [`finalize_streaming`](RenderSink::finalize_streaming), which marks the
/// entry visually completed.
pub trait RenderSink: Send + Sync {
    /// Append a finished message to the transcript.
    fn append_message(&self, role: Role, text: &str);

    /// Create a new streaming entry for incremental updates.
    fn begin_streaming(&self, role: Role) -> TranscriptEntry;

    /// Replace the entry's text with the cumulative response so far.
    fn update_streaming(&self, entry: TranscriptEntry, cumulative: &str);

    /// Seal the entry with its final text.
    fn finalize_streaming(&self, entry: TranscriptEntry, final_text: &str);

    /// Remove every transcript entry.
    fn clear_transcript(&self);

    /// Keep the latest transcript entry visible.
    fn scroll_to_end(&self);

    /// Show or hide the "waiting for the first token" indicator. Also
    /// disables the send control while set.
    fn set_pending(&self, pending: bool);

    /// Transient, toast-style notification.
    fn notify(&self, text: &str);

    /// Re-render the session history list, marking the active session.
    fn render_history_list(&self, sessions: &[SessionSummary], active_id: Option<&str>);

    /// Close the history panel (after switching sessions).
    fn collapse_history(&self);

    /// Ask the user to confirm a destructive operation.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Render sink that displays nothing and confirms everything.
///
/// Useful for tests and headless runs.
#[derive(Default)]
pub struct NoRenderSink {
    next_entry: AtomicU64,
}

impl NoRenderSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for NoRenderSink {
    fn append_message(&self, _role: Role, _text: &str) {}

    fn begin_streaming(&self, _role: Role) -> TranscriptEntry {
        TranscriptEntry::new(self.next_entry.fetch_add(1, Ordering::Relaxed))
    }

    fn update_streaming(&self, _entry: TranscriptEntry, _cumulative: &str) {}

    fn finalize_streaming(&self, _entry: TranscriptEntry, _final_text: &str) {}

    fn clear_transcript(&self) {}

    fn scroll_to_end(&self) {}

    fn set_pending(&self, _pending: bool) {}

    fn notify(&self, _text: &str) {}

    fn render_history_list(&self, _sessions: &[SessionSummary], _active_id: Option<&str>) {}

    fn collapse_history(&self) {}

    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
