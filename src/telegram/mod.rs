//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod keyboards;
pub mod state;

use teloxide::types::InlineKeyboardButton;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError, HandlerResult};
pub use state::{BotDialogue, State};

/// Shorthand for an inline callback button
pub fn cb(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), data.into())
}

/// Escapes user-provided text for HTML parse mode
pub fn esc(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::esc;

    #[test]
    fn test_esc_handles_html_metacharacters() {
        assert_eq!(esc("Дружина <1> & Ко"), "Дружина &lt;1&gt; &amp; Ко");
        assert_eq!(esc("обычное имя"), "обычное имя");
    }
}
