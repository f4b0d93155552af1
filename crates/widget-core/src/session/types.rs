//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for the message (UUID)
    pub id: String,
    pub sender: Sender,
    pub text: String,
}

impl Message {
    /// Create a user message with a fresh id
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// Create a bot message with a fresh id
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// A conversation thread with its own id and message history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier, assigned by the backend
    pub id: String,
    /// Conversation messages in insertion order
    pub messages: Vec<Message>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// True exactly while a reply is outstanding for this session
    pub is_loading: bool,
}

impl ChatSession {
    /// Create an empty session with a backend-assigned id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: Utc::now(),
            is_loading: false,
        }
    }

    /// Append a message to the conversation
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get message count
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if the conversation is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = ChatSession::new("session-123");
        assert_eq!(session.id, "session-123");
        assert!(session.messages.is_empty());
        assert!(!session.is_loading);
    }

    #[test]
    fn test_add_message() {
        let mut session = ChatSession::new("session-123");
        session.add_message(Message::user("Hello"));
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages[0].sender, Sender::User);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::bot("hi");
        let b = Message::bot("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_sender_serialization() {
        let msg = Message::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""sender":"user"#));

        let msg = Message::bot("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""sender":"bot"#));
    }

    #[test]
    fn test_session_json_shape() {
        let session = ChatSession::new("s1");
        let json = serde_json::to_string(&session).unwrap();
        // Field names match the persisted wire shape
        assert!(json.contains(r#""createdAt""#));
        assert!(json.contains(r#""isLoading":false"#));

        let parsed: ChatSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, "s1");
    }
}
