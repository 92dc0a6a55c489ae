//! Port definitions
//!
//! Ports define the interfaces the application layer needs from the outside
//! world. Implementations (adapters) live in the infrastructure and
//! presentation layers.

pub mod completion_gateway;
pub mod history_store;
pub mod render_sink;
