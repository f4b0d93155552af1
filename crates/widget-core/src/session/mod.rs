//! Session module
//!
//! Provides the chat data model and the in-memory session collection that
//! backs the widget UI.

mod store;
mod types;

pub use store::SessionStore;
pub use types::{ChatSession, Message, Sender};
