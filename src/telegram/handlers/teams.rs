//! Добавление команд и постраничный просмотр списка команд

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};

use super::{callback_chat, edit_or_resend, require_admin, HandlerDeps, HandlerResult};
use crate::core::config;
use crate::storage::db::{self, get_connection};
use crate::telegram::{cb, esc, keyboards};
use crate::telegram::state::{BotDialogue, State};

/// Точка входа команды /add_team
pub async fn command_add_team(bot: Bot, dialogue: BotDialogue, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    if !require_admin(&bot, conn, msg.chat.id).await? {
        return Ok(());
    }
    start_add_team(&bot, &dialogue, msg.chat.id, &deps).await
}

/// Предлагает выбрать субботник для новой команды
pub async fn start_add_team(bot: &Bot, dialogue: &BotDialogue, chat_id: ChatId, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let events = db::list_events(&conn)?;

    if events.is_empty() {
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_menu_row()]);
        bot.send_message(chat_id, "⚠️ Пока нет ни одного субботника. Сначала создайте его.")
            .reply_markup(kb)
            .await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|e| vec![cb(e.title.clone(), format!("event:{}", e.id))])
        .collect();
    rows.push(keyboards::back_row("back_to_main"));

    bot.send_message(chat_id, "Выберите субботник, к которому хотите добавить команду:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    dialogue.update(State::AddTeamSelectEvent).await?;
    Ok(())
}

/// Выбор субботника в сценарии добавления команды
pub async fn select_event(bot: Bot, dialogue: BotDialogue, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };
    let Some(event_id) = q.data.as_deref().and_then(|d| d.strip_prefix("event:")).and_then(|s| s.parse::<i64>().ok())
    else {
        return Ok(());
    };

    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("add_team")]);
    bot.send_message(chat_id, "Введите название команды:").reply_markup(kb).await?;
    dialogue.update(State::AwaitTeamName { event_id }).await?;
    Ok(())
}

/// Принимает название команды и сохраняет её
pub async fn receive_team_name(
    bot: Bot,
    dialogue: BotDialogue,
    msg: Message,
    event_id: i64,
    deps: HandlerDeps,
) -> HandlerResult {
    let name = msg.text().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        bot.send_message(msg.chat.id, "❗ Название команды не может быть пустым.").await?;
        return Ok(());
    }

    let conn = get_connection(&deps.db_pool)?;
    let Some(event) = db::get_event(&conn, event_id)? else {
        bot.send_message(msg.chat.id, "⚠️ Ошибка: не удалось найти субботник.").await?;
        dialogue.exit().await?;
        return Ok(());
    };

    let team_id = db::create_team(&conn, name, event_id)?;
    log::info!("👥 Команда добавлена: '{}' (ID {}) → Субботник: '{}' (ID {})", name, team_id, event.title, event.id);

    let kb = InlineKeyboardMarkup::new(vec![keyboards::add_more_row("add_team"), keyboards::back_menu_row()]);
    bot.send_message(
        msg.chat.id,
        format!("✅ Команда <b>{}</b> добавлена к субботнику <b>{}</b>.", esc(name), esc(&event.title)),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(kb)
    .await?;

    dialogue.exit().await?;
    Ok(())
}

/// Постраничный список всех команд с названием их субботника
pub async fn show_team_browser(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    page: usize,
    deps: &HandlerDeps,
) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let teams = db::list_teams_with_event(&conn)?;

    if teams.is_empty() {
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("view_database")]);
        edit_or_resend(bot, chat_id, message_id, "📭 Список команд пуст.", kb).await?;
        return Ok(());
    }

    let per_page = config::pages::TEAM_BROWSER;
    let pages = keyboards::total_pages(teams.len(), per_page);
    let page = page.clamp(1, pages);

    let mut text = format!("<b>👥 Список команд (страница {page}/{pages}):</b>\n\n");
    for team in keyboards::page_slice(&teams, page, per_page) {
        let event_title = team.event_title.as_deref().unwrap_or("❓ Неизвестный субботник");
        text.push_str(&format!("• <b>{}</b> — <i>{}</i>\n", esc(&team.name), esc(event_title)));
    }

    let mut rows = Vec::new();
    if let Some(nav) = keyboards::nav_row(page, pages, "view_teams") {
        rows.push(nav);
    }
    rows.push(keyboards::back_row("view_database"));

    edit_or_resend(bot, chat_id, message_id, &text, InlineKeyboardMarkup::new(rows)).await
}
