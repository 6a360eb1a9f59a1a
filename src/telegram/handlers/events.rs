//! Создание субботников и просмотр их списка

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};

use super::{require_admin, HandlerDeps, HandlerResult};
use crate::storage::db::{self, get_connection};
use crate::telegram::{esc, keyboards};
use crate::telegram::state::{BotDialogue, State};

/// Точка входа команды /create_event
pub async fn command_create_event(bot: Bot, dialogue: BotDialogue, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    if !require_admin(&bot, conn, msg.chat.id).await? {
        return Ok(());
    }
    start_create_event(&bot, &dialogue, msg.chat.id).await
}

/// Запрашивает название нового субботника
pub async fn start_create_event(bot: &Bot, dialogue: &BotDialogue, chat_id: ChatId) -> HandlerResult {
    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("back_to_main")]);
    bot.send_message(chat_id, "Введите название субботника:").reply_markup(kb).await?;
    dialogue.update(State::AwaitEventTitle).await?;
    Ok(())
}

/// Принимает название и создаёт субботник
pub async fn receive_title(bot: Bot, dialogue: BotDialogue, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let title = msg.text().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        bot.send_message(msg.chat.id, "❗ Название субботника не может быть пустым.").await?;
        return Ok(());
    }

    let created_by = msg.from.as_ref().map(|u| i64::try_from(u.id.0).unwrap_or(0)).unwrap_or(0);
    let conn = get_connection(&deps.db_pool)?;
    let event_id = db::create_event(&conn, title, created_by)?;
    log::info!(
        "📅 Субботник создан: '{}' (ID {}) | админ {} | @{}",
        title,
        event_id,
        created_by,
        msg.from.as_ref().and_then(|u| u.username.as_deref()).unwrap_or("-")
    );

    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_menu_row()]);
    bot.send_message(
        msg.chat.id,
        format!("✅ Субботник <b>{}</b> успешно создан!\nID: <code>{}</code>", esc(title), event_id),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(kb)
    .await?;

    dialogue.exit().await?;
    Ok(())
}

/// Список всех субботников
pub async fn show_events(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let events = db::list_events(&conn)?;
    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("view_database")]);

    if events.is_empty() {
        bot.send_message(chat_id, "📭 Список субботников пуст.").reply_markup(kb).await?;
        return Ok(());
    }

    let mut text = String::from("<b>📅 Список субботников:</b>\n\n");
    for event in &events {
        text.push_str(&format!("• <b>{}</b> (ID: <code>{}</code>)\n", esc(&event.title), event.id));
    }
    bot.send_message(chat_id, text).parse_mode(ParseMode::Html).reply_markup(kb).await?;
    Ok(())
}
