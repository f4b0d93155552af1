//! widget-panel: Panel Controller
//!
//! Orchestrates user actions against the session store and the remote
//! session client, and decides when state is persisted.

mod panel;

pub use panel::ChatPanel;
