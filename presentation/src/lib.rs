//! Presentation layer for chatflow
//!
//! This crate contains the console render sink, the interactive chat REPL,
//! and the CLI argument definitions.

pub mod chat;
pub mod cli;
pub mod console;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::Cli;
pub use console::ConsoleRenderSink;
