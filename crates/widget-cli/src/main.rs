//! chat-widget: interactive host for the chat widget
//!
//! Stands in for the web page embedding the widget: wires configuration,
//! storage and the remote backend into a panel controller and drives it
//! from a terminal REPL.
//!
//! Usage:
//!   chat-widget            - Start the interactive REPL
//!   chat-widget --help     - Show help
//!   chat-widget --version  - Show version

mod repl;

use std::path::Path;

use tracing_subscriber::EnvFilter;
use widget_client::HttpBackend;
use widget_core::{SessionStorage, SqliteKv, UiTexts, WidgetConfig};
use widget_panel::ChatPanel;

enum RunMode {
    Repl,
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("chat-widget {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Repl => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = WidgetConfig::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    let texts = load_texts();

    tracing::info!("Starting chat-widget against {}", config.api.base_url);

    if let Some(parent) = Path::new(&config.storage.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let kv = SqliteKv::new(&config.storage.db_path)
        .map_err(|e| anyhow::anyhow!("Failed to open storage: {}", e))?;
    let storage = SessionStorage::new(Box::new(kv));

    let backend = HttpBackend::new(&config, &texts)
        .map_err(|e| anyhow::anyhow!("Failed to create backend client: {}", e))?;

    let panel = ChatPanel::new(backend, storage, texts);
    repl::run(panel).await
}

fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-V" => return RunMode::Version,
            other => {
                eprintln!("Unknown argument: {}", other);
                return RunMode::Help;
            }
        }
    }
    RunMode::Repl
}

/// Load a translated text table when `chat-widget.texts.json` is present
fn load_texts() -> UiTexts {
    let path = Path::new("chat-widget.texts.json");
    if !path.exists() {
        return UiTexts::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(texts) => texts,
            Err(e) => {
                eprintln!("Invalid text table, using defaults: {}", e);
                UiTexts::default()
            }
        },
        Err(e) => {
            eprintln!("Cannot read text table, using defaults: {}", e);
            UiTexts::default()
        }
    }
}

fn print_help() {
    println!("chat-widget - terminal host for the chat widget");
    println!();
    println!("USAGE:");
    println!("    chat-widget [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show this help");
    println!("    -V, --version    Show version");
    println!();
    println!("CONFIGURATION:");
    println!("    chat-widget.toml          API base URL, timeouts, streaming flag");
    println!("    chat-widget.texts.json    Translated UI texts (optional)");
    println!("    CHAT_API_BASE_URL         Override the backend base URL");
    println!("    CHAT_STREAMING            Use the streaming transport (1/true/yes)");
    println!("    CHAT_DB_PATH              Override the local storage path");
}
