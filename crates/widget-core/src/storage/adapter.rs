//! Persistence adapter for the session collection
//!
//! Reads and writes the serialized session list and the last active session
//! id. Every failure path degrades: corrupt or mis-shaped data loads as an
//! empty collection and write failures are swallowed, both with a logged
//! diagnostic. The widget never crashes over its cache; the backend holds
//! the truth.

use tracing::{error, warn};

use crate::session::ChatSession;
use crate::storage::KvStore;

/// Key under which the serialized session collection is stored
pub const SESSIONS_KEY: &str = "chatbot-sessions";
/// Key under which the last active session id is stored
pub const LAST_SESSION_ID_KEY: &str = "chatbot-last-session-id";

/// Session persistence over a key-value store
pub struct SessionStorage {
    kv: Box<dyn KvStore>,
}

impl SessionStorage {
    pub fn new(kv: Box<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Load the saved session collection.
    ///
    /// Returns an empty collection when the key is absent or when the stored
    /// value fails to parse into well-shaped sessions.
    pub fn load(&self) -> Vec<ChatSession> {
        let Some(saved) = self.kv.get(SESSIONS_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<ChatSession>>(&saved) {
            Ok(sessions) => sessions,
            Err(e) => {
                error!("Failed to parse saved chat sessions: {}", e);
                Vec::new()
            }
        }
    }

    /// Resolve the last active session id.
    ///
    /// When no sessions are stored this is `None`. A stored id that matches
    /// a loaded session is returned as-is; otherwise the first session's id
    /// is used and a warning emitted. That fallback is deliberate policy,
    /// not error recovery.
    pub fn load_last_session_id(&self) -> Option<String> {
        let sessions = self.load();
        if sessions.is_empty() {
            return None;
        }

        if let Some(last_id) = self.kv.get(LAST_SESSION_ID_KEY) {
            if !last_id.is_empty() && sessions.iter().any(|s| s.id == last_id) {
                return Some(last_id);
            }
        }

        warn!("No last session id found: setting the current session to the first item.");
        Some(sessions[0].id.clone())
    }

    /// Persist the session collection and last active session id.
    ///
    /// Write failures (the storage-quota analog) are logged and ignored.
    pub fn save(&mut self, sessions: &[ChatSession], last_session_id: Option<&str>) {
        match serde_json::to_string(sessions) {
            Ok(json) => {
                if let Err(e) = self.kv.set(SESSIONS_KEY, &json) {
                    error!("Failed to save chat sessions: {}", e);
                }
            }
            Err(e) => error!("Failed to serialize chat sessions: {}", e),
        }

        if let Err(e) = self.kv.set(LAST_SESSION_ID_KEY, last_session_id.unwrap_or("")) {
            error!("Failed to save last session id: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;

    fn storage_with(sessions_json: Option<&str>, last_id: Option<&str>) -> SessionStorage {
        let mut kv = MemoryKv::new();
        if let Some(json) = sessions_json {
            kv.set(SESSIONS_KEY, json).unwrap();
        }
        if let Some(id) = last_id {
            kv.set(LAST_SESSION_ID_KEY, id).unwrap();
        }
        SessionStorage::new(Box::new(kv))
    }

    fn two_sessions_json() -> String {
        let sessions = vec![ChatSession::new("s1"), ChatSession::new("s2")];
        serde_json::to_string(&sessions).unwrap()
    }

    #[test]
    fn test_load_valid_sessions() {
        let storage = storage_with(Some(&two_sessions_json()), None);
        let sessions = storage.load();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, "s1");
    }

    #[test]
    fn test_load_absent_key() {
        let storage = storage_with(None, None);
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_load_invalid_json() {
        let storage = storage_with(Some("not-json"), None);
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_load_empty_string() {
        let storage = storage_with(Some(""), None);
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_load_member_missing_field() {
        // A member without `messages` does not satisfy the session shape
        let json = r#"[{"id":"bad-session","createdAt":"2024-01-01T00:00:00Z","isLoading":true}]"#;
        let storage = storage_with(Some(json), None);
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_load_member_with_wrong_type() {
        let json = r#"[{"id":"bad-session","messages":"not-a-list","createdAt":"2024-01-01T00:00:00Z","isLoading":true}]"#;
        let storage = storage_with(Some(json), None);
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_last_session_id_matches_stored() {
        let storage = storage_with(Some(&two_sessions_json()), Some("s2"));
        assert_eq!(storage.load_last_session_id(), Some("s2".to_string()));
    }

    #[test]
    fn test_last_session_id_falls_back_to_first() {
        let storage = storage_with(Some(&two_sessions_json()), Some("missing"));
        assert_eq!(storage.load_last_session_id(), Some("s1".to_string()));
    }

    #[test]
    fn test_last_session_id_without_stored_value() {
        let storage = storage_with(Some(&two_sessions_json()), None);
        assert_eq!(storage.load_last_session_id(), Some("s1".to_string()));
    }

    #[test]
    fn test_last_session_id_with_no_sessions() {
        let storage = storage_with(None, Some("s1"));
        assert_eq!(storage.load_last_session_id(), None);
    }

    #[test]
    fn test_save_load_roundtrip_is_idempotent() {
        let mut storage = storage_with(Some(&two_sessions_json()), Some("s2"));

        let loaded = storage.load();
        let last = storage.load_last_session_id();
        storage.save(&loaded, last.as_deref());

        let reloaded = storage.load();
        assert_eq!(reloaded.len(), loaded.len());
        for (a, b) in loaded.iter().zip(reloaded.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.messages, b.messages);
            assert_eq!(a.created_at, b.created_at);
            assert_eq!(a.is_loading, b.is_loading);
        }
        assert_eq!(storage.load_last_session_id(), last);
    }

    #[test]
    fn test_save_with_no_current_session() {
        let mut storage = storage_with(None, None);
        storage.save(&[], None);
        assert!(storage.load().is_empty());
        assert_eq!(storage.load_last_session_id(), None);
    }
}
