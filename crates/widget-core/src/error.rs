//! Error types for widget-core

use thiserror::Error;

/// Main error type for widget-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for widget-core
pub type Result<T> = std::result::Result<T, Error>;
