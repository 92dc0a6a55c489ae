//! Persistence adapters
//!
//! [`json_store`] keeps the session history as a single JSON document on
//! disk, replacing the browser-local storage the client previously used.

pub mod json_store;

pub use json_store::JsonHistoryStore;
