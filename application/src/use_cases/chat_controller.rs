//! Chat controller use case.
//!
//! The single orchestration point for the send-message flow: it appends the
//! user message to the transcript, streams the completion into a live
//! transcript entry, and commits the finished exchange to the context window
//! and the session store. It also owns the session lifecycle operations
//! (new chat, switch, clear, clear all).
//!
//! All mutable chat state (the session store, the context window, and the
//! pending flag) lives on this struct; ports are injected as trait objects.

use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest, GatewayError};
use crate::ports::history_store::HistoryStore;
use crate::ports::render_sink::{RenderSink, SessionSummary, TranscriptEntry};
use chatflow_domain::{ContextMessage, ContextWindow, Role, SessionStore, StreamEvent};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Shown in place of a real answer whenever a send fails. Error detail is
/// logged, never surfaced.
pub const APOLOGY_MESSAGE: &str = "Sorry, I can't reply right now. Please try again later.";

/// Interface-level rejections of a send. Neither has side effects.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SendError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("A message is already being sent")]
    Busy,
}

/// Orchestrates chat exchanges and the session lifecycle.
pub struct ChatController {
    gateway: Arc<dyn CompletionGateway>,
    sink: Arc<dyn RenderSink>,
    history: Arc<dyn HistoryStore>,
    store: SessionStore,
    context: ContextWindow,
    model: String,
    max_tokens: u32,
    temperature: f32,
    welcome: String,
    pending: bool,
}

impl ChatController {
    /// Build a controller, restoring the session store from the history
    /// store. A load failure degrades to an empty store; a snapshot without
    /// a usable active session gets a fresh one.
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        sink: Arc<dyn RenderSink>,
        history: Arc<dyn HistoryStore>,
        model: impl Into<String>,
    ) -> Self {
        let store = match history.load() {
            Ok(Some(snapshot)) => SessionStore::from_snapshot(snapshot),
            Ok(None) => SessionStore::new(),
            Err(e) => {
                warn!(error = %e, "could not load chat history, starting empty");
                SessionStore::new()
            }
        };

        let mut controller = Self {
            gateway,
            sink,
            history,
            store,
            context: ContextWindow::new(),
            model: model.into(),
            max_tokens: 2048,
            temperature: 0.7,
            welcome: "Hello! How can I help you today?".to_string(),
            pending: false,
        };

        if controller.store.active().is_none() {
            controller.store.create_session();
            controller.persist();
        }

        controller
    }

    /// Set the greeting shown on an empty transcript.
    pub fn with_welcome(mut self, welcome: impl Into<String>) -> Self {
        self.welcome = welcome.into();
        self
    }

    /// Override the generation parameters sent with every request.
    pub fn with_generation(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Render the initial transcript and history list. Call once at startup.
    pub fn start(&mut self) {
        self.sink.append_message(Role::Assistant, &self.welcome);
        self.refresh_history_list();
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switch the model used for subsequent requests.
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        self.sink.notify(&format!("Switched to model {}", self.model));
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.store.active_id()
    }

    pub fn context(&self) -> &ContextWindow {
        &self.context
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Session summaries in display order (most recently updated first).
    pub fn session_summaries(&self) -> Vec<SessionSummary> {
        self.store
            .sessions_by_recency()
            .into_iter()
            .map(SessionSummary::from)
            .collect()
    }

    /// Send one user message and stream the reply.
    ///
    /// Empty or whitespace-only input and re-entry while a send is pending
    /// are rejected here, before any side effect. Every other failure is
    /// absorbed: the streaming entry is finalized with [`APOLOGY_MESSAGE`],
    /// nothing is committed, and the call still returns `Ok`.
    ///
    /// There is no timeout and no cancellation: a hung request keeps the
    /// controller pending until the transport gives up.
    pub async fn send_message(&mut self, input: &str) -> Result<(), SendError> {
        let message = input.trim().to_string();
        if message.is_empty() {
            return Err(SendError::EmptyInput);
        }
        if self.pending {
            return Err(SendError::Busy);
        }

        // User message is visible before any network activity
        self.sink.append_message(Role::User, &message);
        self.pending = true;
        self.sink.set_pending(true);

        let entry = self.sink.begin_streaming(Role::Assistant);

        let result = self.stream_exchange(&message, entry).await;
        if let Err(e) = result {
            warn!(error = %e, "send failed");
            self.sink.finalize_streaming(entry, APOLOGY_MESSAGE);
        }

        // Cleanup runs on success and failure alike
        self.pending = false;
        self.sink.set_pending(false);
        self.sink.scroll_to_end();
        Ok(())
    }

    /// Run one request/stream cycle and commit the exchange on completion.
    async fn stream_exchange(
        &mut self,
        message: &str,
        entry: TranscriptEntry,
    ) -> Result<(), GatewayError> {
        let mut messages = self.context.entries().to_vec();
        messages.push(ContextMessage::new(Role::User, message));

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let mut handle = self.gateway.stream_chat(request).await?;

        let mut waiting_for_first = true;
        while let Some(event) = handle.receiver.recv().await {
            match event {
                StreamEvent::Delta { full, .. } => {
                    if waiting_for_first {
                        // Pending means "nothing received yet", not
                        // "request outstanding"
                        self.sink.set_pending(false);
                        waiting_for_first = false;
                    }
                    self.sink.update_streaming(entry, &full);
                    self.sink.scroll_to_end();
                }
                StreamEvent::Completed(final_text) => {
                    self.commit_exchange(message, &final_text, entry);
                    return Ok(());
                }
                StreamEvent::Error(e) => return Err(GatewayError::Stream(e)),
            }
        }

        Err(GatewayError::Stream(
            "stream closed before completion".to_string(),
        ))
    }

    /// Seal the transcript entry and commit the finished exchange to the
    /// context window and the active session.
    fn commit_exchange(&mut self, user: &str, assistant: &str, entry: TranscriptEntry) {
        self.sink.finalize_streaming(entry, assistant);

        self.context.push_exchange(user, assistant);

        if self.store.active().is_none() {
            self.store.create_session();
        }
        self.store.commit_exchange(user, assistant);

        self.persist();
        self.refresh_history_list();

        debug!(
            session = self.store.active_id().unwrap_or("<none>"),
            response_bytes = assistant.len(),
            "exchange committed"
        );
    }

    /// Start a fresh session. The current one stays in history.
    pub fn new_chat(&mut self) {
        let active_is_blank =
            self.store.active().is_none_or(|s| s.messages().is_empty()) && self.context.is_empty();
        if active_is_blank {
            self.sink.notify("This is already a new chat");
            return;
        }

        if !self
            .sink
            .confirm("Start a new chat? The current one is kept in history.")
        {
            return;
        }

        self.store.create_session();
        self.context.reset();
        self.sink.clear_transcript();
        self.sink.append_message(Role::Assistant, &self.welcome);
        self.persist();
        self.refresh_history_list();
        self.sink.notify("Started a new chat");
        info!(session = self.store.active_id().unwrap_or("<none>"), "new chat");
    }

    /// Make another session active and replay its history.
    ///
    /// Unknown ids leave the active session, transcript, and context window
    /// untouched. Returns whether a switch happened.
    pub fn switch_to(&mut self, id: &str) -> bool {
        let Some(session) = self.store.switch_to(id) else {
            return false;
        };
        let messages = session.messages().to_vec();

        self.sink.clear_transcript();
        if messages.is_empty() {
            self.sink.append_message(Role::Assistant, &self.welcome);
        } else {
            for message in &messages {
                self.sink.append_message(message.role, &message.content);
            }
        }

        self.context.rebuild_from(&messages);
        self.persist();
        self.refresh_history_list();
        self.sink.collapse_history();
        self.sink.scroll_to_end();

        info!(session = id, messages = messages.len(), "switched session");
        true
    }

    /// Clear the visible transcript and the live context window.
    ///
    /// The persisted session keeps its messages: switching away and back
    /// restores them. Matches the behavior this client replaces.
    pub fn clear_active(&mut self) {
        if !self
            .sink
            .confirm("Clear the current conversation? The visible messages will be removed.")
        {
            return;
        }

        self.sink.clear_transcript();
        self.sink.append_message(Role::Assistant, &self.welcome);
        self.context.reset();
        self.sink.notify("Conversation cleared");
        debug!("visible transcript cleared; persisted session history unchanged");
    }

    /// Delete every session and start over with a single fresh one.
    pub fn clear_all(&mut self) {
        if !self
            .sink
            .confirm("Delete all chat history? This cannot be undone.")
        {
            return;
        }

        self.store.clear_all();
        self.store.create_session();
        self.context.reset();
        self.sink.clear_transcript();
        self.sink.append_message(Role::Assistant, &self.welcome);
        self.persist();
        self.refresh_history_list();
        self.sink.notify("History cleared");
        info!("all history cleared");
    }

    /// Eagerly save the full store snapshot. Failures are logged and the
    /// session continues.
    fn persist(&self) {
        if let Err(e) = self.history.save(&self.store.snapshot()) {
            warn!(error = %e, "could not persist chat history");
        }
    }

    fn refresh_history_list(&self) {
        self.sink
            .render_history_list(&self.session_summaries(), self.store.active_id());
    }
}
