//! Назначение новых администраторов по username

use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

use super::{HandlerDeps, HandlerResult};
use crate::storage::db::{self, get_connection};
use crate::telegram::keyboards;
use crate::telegram::state::{BotDialogue, State};

/// Запрашивает username будущего админа
pub async fn ask_username(bot: &Bot, dialogue: &BotDialogue, chat_id: ChatId) -> HandlerResult {
    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("back_to_main")]);
    bot.send_message(
        chat_id,
        "Введите username пользователя, которого хотите назначить админом (например: @ivanov)",
    )
    .reply_markup(kb)
    .await?;
    dialogue.update(State::AwaitAdminUsername).await?;
    Ok(())
}

/// Принимает username и выдаёт права, если пользователь уже писал боту
pub async fn receive_username(bot: Bot, dialogue: BotDialogue, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "⚠️ Введите текст — username пользователя.").await?;
        return Ok(());
    };
    let username = text.trim().trim_start_matches('@');
    if username.is_empty() {
        bot.send_message(msg.chat.id, "⚠️ Username не может быть пустым.").await?;
        return Ok(());
    }

    let conn = get_connection(&deps.db_pool)?;
    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_menu_row()]);

    match db::get_user_by_username(&conn, username)? {
        None => {
            bot.send_message(
                msg.chat.id,
                format!("❌ Пользователь @{username} не найден в базе. Он должен сначала написать боту /start."),
            )
            .reply_markup(kb)
            .await?;
        }
        Some(user) if user.is_admin => {
            bot.send_message(msg.chat.id, "⚠️ Этот пользователь уже является админом.")
                .reply_markup(kb)
                .await?;
        }
        Some(user) => {
            db::set_user_admin(&conn, user.telegram_id)?;
            let promoted_by = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);
            log::info!("🔐 Добавлен админ: {} | @{} — добавил: {}", user.telegram_id, username, promoted_by);
            bot.send_message(msg.chat.id, format!("✅ Пользователь @{username} теперь админ!"))
                .reply_markup(kb)
                .await?;
        }
    }

    dialogue.exit().await?;
    Ok(())
}
