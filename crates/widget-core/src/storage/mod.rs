//! Persistence module
//!
//! A small key-value abstraction standing in for the page-scoped storage the
//! widget lives on, plus the adapter that serializes the session collection
//! and the last active session id through it.

mod adapter;
mod kv;

pub use adapter::{SESSIONS_KEY, LAST_SESSION_ID_KEY, SessionStorage};
pub use kv::{KvStore, MemoryKv, SqliteKv};
