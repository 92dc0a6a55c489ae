//! Chat session domain model
//!
//! - [`entities`]: messages and persisted sessions
//! - [`context`]: the capped conversation context sent with each request
//! - [`store`]: the in-memory session collection and its persisted snapshot
//! - [`stream`]: events emitted while a streaming response is decoded

pub mod context;
pub mod entities;
pub mod store;
pub mod stream;
