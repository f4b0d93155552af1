//! Backend trait
//!
//! The seam between the panel controller and the remote session client. The
//! contract is deliberately infallible: transports resolve every failure into
//! a fallback value (empty-id sentinel, fallback bot message) so the UI layer
//! never handles raw network errors.

use async_trait::async_trait;

use crate::session::Message;

/// Remote operations the panel controller depends on
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Create a new remote session.
    ///
    /// Returns the new session id, or the empty string when creation failed
    /// for any reason. Callers must treat the empty string as failure, never
    /// as a valid id.
    async fn create_session(&self) -> String;

    /// Exchange a user message for a bot reply.
    ///
    /// Always resolves to a bot `Message`; on failure or an empty reply the
    /// message carries the localizable fallback error text.
    async fn send_message(&self, session_id: &str, text: &str) -> Message;

    /// Delete a remote session. Fire and forget: failures are logged by the
    /// implementation and otherwise ignored.
    async fn delete_session(&self, session_id: &str);
}
