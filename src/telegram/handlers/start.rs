//! /start, главное меню и подменю базы данных

use teloxide::prelude::*;
use teloxide::types::MessageId;

use super::{edit_or_resend, HandlerDeps, HandlerResult};
use crate::core::config;
use crate::storage::db::{self, get_connection};
use crate::telegram::keyboards;
use crate::telegram::state::BotDialogue;

/// Обработчик /start: регистрирует пользователя и пускает в меню только админов
pub async fn handle_start(bot: Bot, dialogue: BotDialogue, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let Some(from) = msg.from.as_ref() else {
        bot.send_message(msg.chat.id, "⚠️ Не удалось определить отправителя.").await?;
        return Ok(());
    };

    // /start всегда сбрасывает незавершённый сценарий
    dialogue.exit().await?;

    let telegram_id = i64::try_from(from.id.0).unwrap_or(0);
    let username = from.username.as_deref();
    let conn = get_connection(&deps.db_pool)?;

    let user = match db::get_user(&conn, telegram_id)? {
        Some(user) => user,
        None => {
            let is_admin = config::is_bootstrap_admin(telegram_id);
            db::create_user(&conn, telegram_id, username, &from.first_name, is_admin)?;
            log::info!(
                "🆕 Новый пользователь: {} | @{} | is_admin={}",
                telegram_id,
                username.unwrap_or("-"),
                is_admin
            );
            db::User {
                telegram_id,
                username: from.username.clone(),
                first_name: from.first_name.clone(),
                is_admin,
            }
        }
    };

    if !user.is_admin {
        bot.send_message(msg.chat.id, "⛔ У тебя нет прав для использования бота.").await?;
        log::info!("⛔ Доступ запрещён обычному пользователю: {} | @{}", telegram_id, username.unwrap_or("-"));
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Привет, админ! 👋\nВыбирай действие в меню ниже.")
        .reply_markup(keyboards::main_menu_kb())
        .await?;
    log::info!("✅ Админ зашёл в бота: {} | @{}", telegram_id, username.unwrap_or("-"));

    Ok(())
}

/// Возврат в главное меню из любого места
pub async fn back_to_main(bot: &Bot, dialogue: &BotDialogue, chat_id: ChatId, message_id: MessageId) -> HandlerResult {
    dialogue.exit().await?;
    edit_or_resend(bot, chat_id, message_id, "🏠 Главное меню", keyboards::main_menu_kb()).await
}

/// Подменю просмотра базы данных
pub async fn show_view_database(bot: &Bot, chat_id: ChatId, message_id: MessageId) -> HandlerResult {
    edit_or_resend(
        bot,
        chat_id,
        message_id,
        "📂 Просмотр базы данных. Что показать?",
        keyboards::view_database_kb(),
    )
    .await
}
