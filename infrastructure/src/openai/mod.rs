//! OpenAI-compatible completions adapter
//!
//! [`gateway`] implements the [`CompletionGateway`] port over a
//! `/chat/completions` endpoint with `stream: true`; [`sse`] decodes the
//! `data:`-framed response body into [`StreamEvent`]s.
//!
//! [`CompletionGateway`]: chatflow_application::CompletionGateway
//! [`StreamEvent`]: chatflow_domain::StreamEvent

pub mod gateway;
pub mod sse;
