//! Use cases
//!
//! [`chat_controller`] holds the single orchestration entry point for
//! sending a message and the session lifecycle operations around it.

pub mod chat_controller;
