//! In-memory session collection and its persisted snapshot.
//!
//! [`SessionStore`] holds every session plus a pointer to the active one.
//! Sessions are never deleted individually: only [`SessionStore::clear_all`]
//! empties the store, and the caller immediately creates a fresh session.
//! [`StoreSnapshot`] is the exact shape written to the persistence backend.

use super::entities::Session;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh session id.
///
/// Epoch milliseconds plus a random component, so two calls within the same
/// millisecond still produce distinct ids.
pub fn new_session_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("chat_{}_{}", millis, &random[..8])
}

/// Persisted shape of the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub sessions: Vec<Session>,
    pub active_id: Option<String>,
}

/// All sessions plus the active pointer.
///
/// Invariant: a non-`None` active id always references an existing session.
/// Snapshots that violate this (e.g. hand-edited files) load with the
/// pointer cleared.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Vec<Session>,
    active_id: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a persisted snapshot, clearing a dangling active pointer.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let StoreSnapshot {
            sessions,
            active_id,
        } = snapshot;

        let active_id = active_id.filter(|id| sessions.iter().any(|s| s.id() == id));

        Self {
            sessions,
            active_id,
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            sessions: self.sessions.clone(),
            active_id: self.active_id.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&Session> {
        let id = self.active_id.as_deref()?;
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// Create a fresh session, insert it at the front, and make it active.
    pub fn create_session(&mut self) -> &Session {
        let session = Session::new(new_session_id());
        self.active_id = Some(session.id().to_string());
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    /// Commit a finished exchange to the active session.
    ///
    /// Returns `None` when no session is active; the caller is expected to
    /// create one first.
    pub fn commit_exchange(
        &mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Option<&Session> {
        let id = self.active_id.clone()?;
        let session = self.sessions.iter_mut().find(|s| s.id() == id)?;
        session.record_exchange(user, assistant);
        Some(session)
    }

    /// Make the given session active. Unknown ids are a no-op returning
    /// `None`; the previously active session stays active.
    pub fn switch_to(&mut self, id: &str) -> Option<&Session> {
        let session = self.sessions.iter().find(|s| s.id() == id)?;
        self.active_id = Some(session.id().to_string());
        self.active()
    }

    /// Remove every session and clear the active pointer.
    pub fn clear_all(&mut self) {
        self.sessions.clear();
        self.active_id = None;
    }

    /// Sessions in display order: most recently updated first. Recomputed
    /// from `updated_at`, not insertion order.
    pub fn sessions_by_recency(&self) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self.sessions.iter().collect();
        sessions.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_session_sets_active() {
        let mut store = SessionStore::new();
        let id = store.create_session().id().to_string();

        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), Some(id.as_str()));
    }

    #[test]
    fn rapid_session_ids_are_distinct() {
        // Both calls almost certainly land in the same millisecond
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
    }

    #[test]
    fn session_ids_carry_the_chat_prefix() {
        assert!(new_session_id().starts_with("chat_"));
    }

    #[test]
    fn commit_exchange_requires_active_session() {
        let mut store = SessionStore::new();
        assert!(store.commit_exchange("Hello", "Hi").is_none());

        store.create_session();
        let session = store.commit_exchange("Hello", "Hi").unwrap();
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn switch_to_unknown_id_is_a_no_op() {
        let mut store = SessionStore::new();
        let active = store.create_session().id().to_string();

        assert!(store.switch_to("chat_missing").is_none());
        assert_eq!(store.active_id(), Some(active.as_str()));
    }

    #[test]
    fn switch_to_existing_id_changes_active() {
        let mut store = SessionStore::new();
        let first = store.create_session().id().to_string();
        store.create_session();

        let session = store.switch_to(&first).unwrap();
        assert_eq!(session.id(), first);
        assert_eq!(store.active_id(), Some(first.as_str()));
    }

    #[test]
    fn clear_all_empties_the_store() {
        let mut store = SessionStore::new();
        store.create_session();
        store.create_session();
        store.create_session();

        store.clear_all();
        assert!(store.is_empty());
        assert!(store.active_id().is_none());
    }

    #[test]
    fn recency_order_follows_updated_at_not_insertion() {
        let mut store = SessionStore::new();
        let first = store.create_session().id().to_string();
        let second = store.create_session().id().to_string();

        // Committing to the older session makes it the most recent
        store.switch_to(&first);
        store.commit_exchange("Hello", "Hi");

        let ordered = store.sessions_by_recency();
        assert_eq!(ordered[0].id(), first);
        assert_eq!(ordered[1].id(), second);
    }

    #[test]
    fn snapshot_round_trip() {
        let mut store = SessionStore::new();
        store.create_session();
        store.commit_exchange("Hello", "Hi");

        let snapshot = store.snapshot();
        let restored = SessionStore::from_snapshot(snapshot);

        assert_eq!(restored.len(), 1);
        assert_eq!(restored.active_id(), store.active_id());
        assert_eq!(restored.active().unwrap().messages().len(), 2);
    }

    #[test]
    fn dangling_active_pointer_is_cleared_on_load() {
        let snapshot = StoreSnapshot {
            sessions: vec![Session::new("chat_real")],
            active_id: Some("chat_gone".to_string()),
        };

        let store = SessionStore::from_snapshot(snapshot);
        assert!(store.active_id().is_none());
        assert_eq!(store.len(), 1);
    }
}
