//! JSON file history store

use chatflow_application::{HistoryStore, StorageError};
use chatflow_domain::StoreSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// [`HistoryStore`] backed by a single JSON file.
///
/// The whole snapshot is rewritten on every save. Writes go through a
/// sibling temp file and an atomic rename, so a crash mid-save leaves the
/// previous history intact rather than a truncated document.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<Option<StoreSnapshot>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&contents)?;
        debug!(path = %self.path.display(), "loaded session history");
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            sessions = snapshot.sessions.len(),
            "saved session history"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatflow_domain::SessionStore;
    use tempfile::TempDir;

    fn snapshot_with_one_exchange() -> StoreSnapshot {
        let mut store = SessionStore::new();
        store.create_session();
        store.commit_exchange("Hello", "Hi there");
        store.snapshot()
    }

    #[test]
    fn load_returns_none_when_file_is_missing() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        let snapshot = snapshot_with_one_exchange();

        store.save(&snapshot).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.sessions.len(), 1);
        assert_eq!(loaded.active_id, snapshot.active_id);
        assert_eq!(loaded.sessions[0].messages().len(), 2);
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("nested/deeper/history.json"));

        store.save(&snapshot_with_one_exchange()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        store.save(&snapshot_with_one_exchange()).unwrap();

        let mut sessions = SessionStore::new();
        sessions.create_session();
        sessions.create_session();
        store.save(&sessions.snapshot()).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.sessions.len(), 2);
    }

    #[test]
    fn corrupt_file_surfaces_a_serialize_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonHistoryStore::new(path);
        assert!(matches!(store.load(), Err(StorageError::Serialize(_))));
    }

    #[test]
    fn persisted_document_uses_camel_case_keys() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        store.save(&snapshot_with_one_exchange()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();

        assert!(raw.contains("\"activeId\""));
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"updatedAt\""));
    }
}
