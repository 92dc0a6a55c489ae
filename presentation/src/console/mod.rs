//! Console rendering
//!
//! [`sink`] adapts the render sink port to a terminal: colored role labels,
//! incremental streaming output, and an indicatif spinner for the pending
//! state.

pub mod sink;

pub use sink::ConsoleRenderSink;
