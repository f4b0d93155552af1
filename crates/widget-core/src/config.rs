//! Configuration management
//!
//! Settings are resolved in the following order:
//! 1. Environment variables
//! 2. `chat-widget.toml` configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the chatbot backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Streaming transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StreamConfig {
    /// Whether message exchange uses the token-streaming transport
    #[serde(default)]
    pub enabled: bool,

    /// WebSocket base URL; derived from the API base URL when unset
    pub base_url: Option<String>,
}

/// Per-operation request timeouts, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_create_session_ms")]
    pub create_session_ms: u64,

    #[serde(default = "default_delete_session_ms")]
    pub delete_session_ms: u64,

    /// Reply generation may be slow, so this one is much longer
    #[serde(default = "default_generate_message_ms")]
    pub generate_message_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            create_session_ms: default_create_session_ms(),
            delete_session_ms: default_delete_session_ms(),
            generate_message_ms: default_generate_message_ms(),
        }
    }
}

/// Local persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file backing the key-value store
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Main configuration for the chat widget
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WidgetConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_create_session_ms() -> u64 {
    3_000
}

fn default_delete_session_ms() -> u64 {
    3_000
}

fn default_generate_message_ms() -> u64 {
    300_000
}

fn default_db_path() -> String {
    "data/chat-widget.db".to_string()
}

impl WidgetConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from the default path.
    ///
    /// Reads `./chat-widget.toml` when present, otherwise starts from
    /// defaults; environment variables take precedence either way.
    pub fn load() -> crate::Result<Self> {
        if Path::new("chat-widget.toml").exists() {
            return Self::from_toml_file("chat-widget.toml");
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override settings from environment variables
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CHAT_API_BASE_URL") {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }

        if let Ok(streaming) = std::env::var("CHAT_STREAMING") {
            if !streaming.is_empty() {
                self.stream.enabled = matches!(streaming.as_str(), "1" | "true" | "yes");
            }
        }

        if let Ok(db_path) = std::env::var("CHAT_DB_PATH") {
            if !db_path.is_empty() {
                self.storage.db_path = db_path;
            }
        }
    }

    /// WebSocket base URL for the streaming transport.
    ///
    /// Falls back to the API base URL with an `http` -> `ws` scheme swap.
    pub fn ws_base_url(&self) -> String {
        match &self.stream.base_url {
            Some(url) => url.clone(),
            None => {
                if let Some(rest) = self.api.base_url.strip_prefix("https") {
                    format!("wss{}", rest)
                } else if let Some(rest) = self.api.base_url.strip_prefix("http") {
                    format!("ws{}", rest)
                } else {
                    self.api.base_url.clone()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert!(!config.stream.enabled);
        assert_eq!(config.timeouts.create_session_ms, 3_000);
        assert_eq!(config.timeouts.delete_session_ms, 3_000);
        assert_eq!(config.timeouts.generate_message_ms, 300_000);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [api]
            base_url = "https://chat.example.com"

            [stream]
            enabled = true

            [timeouts]
            generate_message_ms = 60000
        "#;

        let config: WidgetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://chat.example.com");
        assert!(config.stream.enabled);
        assert_eq!(config.timeouts.generate_message_ms, 60_000);
        // Unspecified sections keep their defaults
        assert_eq!(config.timeouts.create_session_ms, 3_000);
        assert_eq!(config.storage.db_path, "data/chat-widget.db");
    }

    #[test]
    fn test_ws_base_url_derivation() {
        let mut config = WidgetConfig::default();
        assert_eq!(config.ws_base_url(), "ws://localhost:8000");

        config.api.base_url = "https://chat.example.com".to_string();
        assert_eq!(config.ws_base_url(), "wss://chat.example.com");

        config.stream.base_url = Some("ws://stream.example.com".to_string());
        assert_eq!(config.ws_base_url(), "ws://stream.example.com");
    }
}
