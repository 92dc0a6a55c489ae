//! History store port
//!
//! Durable persistence for the session store snapshot. Persistence is eager:
//! every mutating controller operation saves the full snapshot before
//! returning. Failures degrade to the empty/default state and are logged,
//! never surfaced to the user.

use chatflow_domain::StoreSnapshot;
use thiserror::Error;

/// Errors that can occur while loading or saving history
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence backend for the session store.
pub trait HistoryStore: Send + Sync {
    /// Load the last saved snapshot. `Ok(None)` when nothing has been saved
    /// yet.
    fn load(&self) -> Result<Option<StoreSnapshot>, StorageError>;

    /// Save the full snapshot, replacing whatever was there.
    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StorageError>;
}

/// History store that persists nothing.
///
/// Every load reports an empty history; saves are discarded.
pub struct NullHistoryStore;

impl HistoryStore for NullHistoryStore {
    fn load(&self) -> Result<Option<StoreSnapshot>, StorageError> {
        Ok(None)
    }

    fn save(&self, _snapshot: &StoreSnapshot) -> Result<(), StorageError> {
        Ok(())
    }
}
