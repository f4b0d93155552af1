//! Localizable UI texts
//!
//! Every user-visible string lives in one table so embedders can swap in a
//! translated set (e.g. deserialized from JSON) without touching widget code.

use serde::{Deserialize, Serialize};

/// Text table for the widget UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiTexts {
    /// Shown as the bot reply when the exchange failed or came back empty
    pub error_message: String,
    pub welcome_message: String,
    pub welcome_description: String,
    pub create_new_chat: String,
    pub popup_title: String,
    pub popup_message: String,
    pub popup_delete_button: String,
    pub popup_cancel_button: String,
    pub toggle_button_label: String,
}

impl Default for UiTexts {
    fn default() -> Self {
        Self {
            error_message: "Sorry, something went wrong. Please try again.".to_string(),
            welcome_message: "Welcome!".to_string(),
            welcome_description: "Start a new chat to ask the assistant anything.".to_string(),
            create_new_chat: "New chat".to_string(),
            popup_title: "Delete this chat?".to_string(),
            popup_message: "This will permanently remove the conversation.".to_string(),
            popup_delete_button: "Delete".to_string(),
            popup_cancel_button: "Cancel".to_string(),
            toggle_button_label: "Chat".to_string(),
        }
    }
}
