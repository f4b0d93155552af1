//! Error types for widget-client
//!
//! Internal only: the public client surface converts every error into a
//! fallback value before it reaches the UI layer.

use thiserror::Error;

/// widget-client error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),
}

/// Result type alias for widget-client
pub type Result<T> = std::result::Result<T, ClientError>;
