//! In-memory session collection
//!
//! The authoritative state machine for session and message mutation. Each
//! session is either idle or awaiting a reply (`is_loading`); the store also
//! owns the current-session pointer. Operations on a missing session return
//! `Error::SessionNotFound` so callers can log and continue: a reply may
//! land after its session was deleted, and that must never crash the UI.

use tracing::warn;

use crate::error::{Error, Result};
use crate::session::{ChatSession, Message};

/// Ordered collection of chat sessions, newest-created first
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    current_id: Option<String>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate a store from persisted state.
    ///
    /// A `last_id` that does not resolve to a loaded session is discarded.
    pub fn from_parts(sessions: Vec<ChatSession>, last_id: Option<String>) -> Self {
        let current_id = last_id.filter(|id| sessions.iter().any(|s| s.id == *id));
        Self {
            sessions,
            current_id,
        }
    }

    /// All sessions, newest-created first
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Id of the currently selected session, if any
    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// The currently selected session, if any
    pub fn current_session(&self) -> Option<&ChatSession> {
        let id = self.current_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Look up a session by id
    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut ChatSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    /// Prepend a new empty session and select it.
    ///
    /// Session ids are unique within the collection; a duplicate id is
    /// rejected without touching the current-session pointer.
    pub fn add_session(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.session(&id).is_some() {
            warn!("Session {} already exists, not adding", id);
            return;
        }
        self.sessions.insert(0, ChatSession::new(id.clone()));
        self.current_id = Some(id);
    }

    /// Append a message to the named session.
    ///
    /// Tolerates the session having been deleted while a send was in
    /// flight: the message is dropped and an error returned.
    pub fn append_message(&mut self, session_id: &str, message: Message) -> Result<()> {
        self.session_mut(session_id)?.add_message(message);
        Ok(())
    }

    /// Mark the named session as awaiting a reply
    pub fn begin_send(&mut self, session_id: &str) -> Result<()> {
        self.session_mut(session_id)?.is_loading = true;
        Ok(())
    }

    /// Mark the named session as idle again.
    ///
    /// Applies unconditionally: a fallback reply still ends the loading
    /// state.
    pub fn end_send(&mut self, session_id: &str) -> Result<()> {
        self.session_mut(session_id)?.is_loading = false;
        Ok(())
    }

    /// Whether the named session is awaiting a reply
    pub fn is_loading(&self, session_id: &str) -> bool {
        self.session(session_id).is_some_and(|s| s.is_loading)
    }

    /// Select the named session
    pub fn switch_to(&mut self, session_id: &str) -> Result<()> {
        if self.session(session_id).is_none() {
            return Err(Error::SessionNotFound(session_id.to_string()));
        }
        self.current_id = Some(session_id.to_string());
        Ok(())
    }

    /// Remove the named session.
    ///
    /// If it was the selected one, the pointer moves to the new first
    /// session, or to none when the collection becomes empty.
    pub fn delete_session(&mut self, session_id: &str) -> Result<()> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != session_id);
        if self.sessions.len() == before {
            return Err(Error::SessionNotFound(session_id.to_string()));
        }

        if self.current_id.as_deref() == Some(session_id) {
            self.current_id = self.sessions.first().map(|s| s.id.clone());
        }
        Ok(())
    }

    /// Session count
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Decompose into persisted parts (sessions, current id)
    pub fn to_parts(&self) -> (&[ChatSession], Option<&str>) {
        (&self.sessions, self.current_id.as_deref())
    }
}
