//! widget-core: Chat Widget Core Library
//!
//! Data model, session state machine, persistence adapter, configuration
//! and localizable texts for the embeddable chat widget.

pub mod backend;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod texts;

pub use backend::ChatBackend;
pub use config::{ApiConfig, StorageConfig, StreamConfig, TimeoutsConfig, WidgetConfig};
pub use error::{Error, Result};
pub use session::{ChatSession, Message, Sender, SessionStore};
pub use storage::{KvStore, MemoryKv, SessionStorage, SqliteKv};
pub use texts::UiTexts;
