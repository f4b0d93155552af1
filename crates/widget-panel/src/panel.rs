//! Panel controller
//!
//! Owns the session store, the backend client, the persistence adapter and
//! the panel's UI flags. All mutation funnels through here: user actions
//! mutate local state optimistically, network effects reconcile it, and
//! persistence happens only at designated checkpoints (`persist`), not on
//! every change.

use tracing::{debug, error, info};

use widget_core::{ChatBackend, Message, SessionStore, SessionStorage, UiTexts};

/// Toggleable chat panel over a session store and a remote backend
pub struct ChatPanel<B: ChatBackend> {
    store: SessionStore,
    backend: B,
    storage: SessionStorage,
    texts: UiTexts,
    input: String,
    is_open: bool,
    is_sidebar_open: bool,
    is_popup_open: bool,
    pending_delete_id: Option<String>,
}

impl<B: ChatBackend> ChatPanel<B> {
    /// Create a panel, hydrating sessions and the current-session pointer
    /// from persisted state.
    pub fn new(backend: B, storage: SessionStorage, texts: UiTexts) -> Self {
        let sessions = storage.load();
        let last_id = storage.load_last_session_id();
        let store = SessionStore::from_parts(sessions, last_id);

        Self {
            store,
            backend,
            storage,
            texts,
            input: String::new(),
            is_open: false,
            is_sidebar_open: false,
            is_popup_open: false,
            pending_delete_id: None,
        }
    }

    /// Toggle panel visibility. Pure local state, no network effect.
    pub fn toggle_panel(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Toggle the session sidebar
    pub fn toggle_sidebar(&mut self) {
        self.is_sidebar_open = !self.is_sidebar_open;
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.is_sidebar_open
    }

    pub fn is_popup_open(&self) -> bool {
        self.is_popup_open
    }

    pub fn pending_delete_id(&self) -> Option<&str> {
        self.pending_delete_id.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input buffer contents
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The session store (read-only view for rendering)
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The UI text table
    pub fn texts(&self) -> &UiTexts {
        &self.texts
    }

    /// Messages of the current session; empty when nothing is selected
    pub fn current_messages(&self) -> &[Message] {
        match self.store.current_session() {
            Some(session) => &session.messages,
            None => &[],
        }
    }

    /// Whether the current session is awaiting a reply
    pub fn is_current_loading(&self) -> bool {
        self.store
            .current_session()
            .is_some_and(|s| s.is_loading)
    }

    /// Create a new remote session and select it.
    ///
    /// Returns false when the backend handed back the empty-id sentinel; the
    /// collection and pointer are left untouched in that case.
    pub async fn new_session(&mut self) -> bool {
        let id = self.backend.create_session().await;
        if id.is_empty() {
            error!("Session creation failed, leaving current session unchanged");
            return false;
        }

        info!("Created chat session {}", id);
        self.store.add_session(id);
        true
    }

    /// Send the input buffer to the current session.
    ///
    /// No-op when the trimmed input is empty or no session is selected. The
    /// user message is appended before the exchange starts, so it is always
    /// visible before the bot (or fallback) reply regardless of latency. A
    /// reply for a session deleted mid-flight is dropped by the store.
    pub async fn send_message(&mut self) {
        let text = self.input.trim().to_string();
        let Some(session_id) = self.store.current_id().map(String::from) else {
            error!("No session selected, ignoring send");
            return;
        };
        if text.is_empty() {
            error!("Empty message provided, ignoring send");
            return;
        }

        self.input.clear();

        if let Err(e) = self.store.append_message(&session_id, Message::user(text.as_str())) {
            error!("Failed to append user message: {}", e);
            return;
        }
        if let Err(e) = self.store.begin_send(&session_id) {
            error!("Failed to mark session as loading: {}", e);
        }

        let bot_message = self.backend.send_message(&session_id, &text).await;

        // The session may have been deleted while the reply was in flight;
        // both mutations then degrade to logged no-ops.
        if let Err(e) = self.store.append_message(&session_id, bot_message) {
            debug!("Dropping stale reply: {}", e);
        }
        if let Err(e) = self.store.end_send(&session_id) {
            debug!("Session gone before end of send: {}", e);
        }
    }

    /// Select another session and close the sidebar
    pub fn switch_session(&mut self, session_id: &str) {
        self.is_sidebar_open = false;
        if let Err(e) = self.store.switch_to(session_id) {
            error!("Cannot switch session: {}", e);
        }
    }

    /// First step of deletion: remember the target and open the
    /// confirmation popup.
    pub fn request_delete(&mut self, session_id: impl Into<String>) {
        self.pending_delete_id = Some(session_id.into());
        self.is_popup_open = true;
    }

    /// Abort a pending deletion, clearing both popup flag and target
    pub fn cancel_delete(&mut self) {
        self.pending_delete_id = None;
        self.is_popup_open = false;
    }

    /// Second step of deletion: remove the pending session.
    ///
    /// The remote delete is fire and forget; local state is removed
    /// regardless of the remote outcome.
    pub async fn confirm_delete(&mut self) {
        let Some(session_id) = self.pending_delete_id.take() else {
            error!("No session selected to delete");
            self.is_popup_open = false;
            return;
        };

        self.backend.delete_session(&session_id).await;

        if let Err(e) = self.store.delete_session(&session_id) {
            error!("Failed to delete session locally: {}", e);
        } else {
            info!("Deleted chat session {}", session_id);
        }
        self.is_popup_open = false;
    }

    /// Persistence checkpoint: write sessions and the current session id.
    ///
    /// Called on panel teardown rather than on every mutation, trading a
    /// potentially stale cache for less write amplification. The backend
    /// remains the source of truth.
    pub fn persist(&mut self) {
        let (sessions, last_id) = self.store.to_parts();
        self.storage.save(sessions, last_id);
    }
}
