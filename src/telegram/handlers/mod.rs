//! Handler tree configuration and shared handler plumbing
//!
//! The dispatcher schema lives in [`schema`]; the per-flow handlers are
//! organized the same way the conversation flows are: one module per flow.

pub mod admin;
pub mod events;
pub mod export;
pub mod menu;
pub mod report;
pub mod schema;
pub mod score;
pub mod score_manage;
pub mod start;
pub mod teams;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode};

use crate::core::config;
use crate::storage::db::{self, DbConnection, DbPool};

pub use schema::schema;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for handlers
pub type HandlerResult = Result<(), HandlerError>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
}

impl HandlerDeps {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }
}

/// Chat and message id behind a callback query, when the message is
/// still accessible
pub(crate) fn callback_chat(q: &CallbackQuery) -> Option<(ChatId, MessageId)> {
    let msg = q.message.as_ref()?;
    Some((msg.chat().id, msg.id()))
}

/// Edits a menu message in place; falls back to delete + send when the
/// message can no longer be edited (too old, wrong type)
pub(crate) async fn edit_or_resend(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: &str,
    keyboard: InlineKeyboardMarkup,
) -> HandlerResult {
    let edited = bot
        .edit_message_text(chat_id, message_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard.clone())
        .await;
    if edited.is_err() {
        let _ = bot.delete_message(chat_id, message_id).await;
        bot.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;
    }
    Ok(())
}

/// Admin gate for command entrypoints. Sends the refusal itself and
/// returns `false` when the chat is not an administrator.
pub(crate) async fn require_admin(bot: &Bot, conn: DbConnection, chat_id: ChatId) -> Result<bool, HandlerError> {
    let is_admin = match db::get_user(&conn, chat_id.0)? {
        Some(user) => user.is_admin,
        None => config::is_bootstrap_admin(chat_id.0),
    };
    if !is_admin {
        bot.send_message(chat_id, "⛔ У тебя нет прав для использования бота.").await?;
        log::info!("⛔ Доступ запрещён обычному пользователю: {}", chat_id.0);
    }
    Ok(is_admin)
}

/// Fallback for callback taps no flow expects (stale keyboards); just
/// stops the client spinner
pub(crate) async fn unhandled_callback(bot: Bot, q: CallbackQuery) -> HandlerResult {
    let _ = bot.answer_callback_query(q.id).await;
    Ok(())
}
