//! Мастер начисления баллов
//!
//! Сценарий: субботник → команда (с постраничным списком) → категория →
//! (количество баллов, если у категории нет фиксированной ставки) →
//! подтверждение. После начисления мастер возвращается к выбору категории,
//! чтобы той же команде можно было проставить несколько категорий подряд.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};

use super::{callback_chat, edit_or_resend, require_admin, HandlerDeps, HandlerResult};
use crate::core::categories::{self, PointSpec};
use crate::core::config;
use crate::storage::db::{self, get_connection};
use crate::telegram::{cb, esc, keyboards};
use crate::telegram::state::{BotDialogue, State};

/// Точка входа команды /score
pub async fn command_score(bot: Bot, dialogue: BotDialogue, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    if !require_admin(&bot, conn, msg.chat.id).await? {
        return Ok(());
    }
    start_wizard(&bot, &dialogue, msg.chat.id, &deps).await
}

/// Первый шаг мастера: выбор субботника
pub async fn start_wizard(bot: &Bot, dialogue: &BotDialogue, chat_id: ChatId, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let events = db::list_events(&conn)?;

    if events.is_empty() {
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_menu_row()]);
        bot.send_message(chat_id, "❗ Пока нет ни одного субботника.").reply_markup(kb).await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|e| vec![cb(e.title.clone(), format!("score_event:{}", e.id))])
        .collect();
    rows.push(keyboards::back_menu_row());

    bot.send_message(chat_id, "Выберите субботник для начисления баллов:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    dialogue.update(State::ScoreSelectEvent).await?;
    Ok(())
}

/// Выбор субботника → список команд
pub async fn select_event(bot: Bot, dialogue: BotDialogue, q: CallbackQuery, deps: HandlerDeps) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };
    let data = q.data.as_deref().unwrap_or_default();

    if data == "score_stop" {
        return finish_wizard(&bot, &dialogue, chat_id).await;
    }
    let Some(event_id) = data.strip_prefix("score_event:").and_then(|s| s.parse::<i64>().ok()) else {
        return Ok(());
    };

    let conn = get_connection(&deps.db_pool)?;
    let teams = db::list_event_teams(&conn, event_id)?;
    if teams.is_empty() {
        bot.send_message(chat_id, "❗ В этом субботнике пока нет команд.").await?;
        dialogue.exit().await?;
        return Ok(());
    }

    render_team_page(&bot, chat_id, None, &teams, 1).await?;
    dialogue.update(State::ScoreSelectTeam { event_id }).await?;
    Ok(())
}

/// Выбор команды, с листанием страниц внутри того же сообщения
pub async fn select_team(
    bot: Bot,
    dialogue: BotDialogue,
    q: CallbackQuery,
    event_id: i64,
    deps: HandlerDeps,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, message_id)) = callback_chat(&q) else {
        return Ok(());
    };
    let data = q.data.as_deref().unwrap_or_default();

    if data == "score_stop" {
        return finish_wizard(&bot, &dialogue, chat_id).await;
    }

    if let Some(page) = data.strip_prefix("score_page:").and_then(|s| s.parse::<usize>().ok()) {
        let conn = get_connection(&deps.db_pool)?;
        let teams = db::list_event_teams(&conn, event_id)?;
        render_team_page(&bot, chat_id, Some(message_id), &teams, page).await?;
        return Ok(());
    }

    let Some(team_id) = data.strip_prefix("score_team:").and_then(|s| s.parse::<i64>().ok()) else {
        return Ok(());
    };
    let conn = get_connection(&deps.db_pool)?;
    let Some(team) = db::get_team(&conn, team_id)? else {
        bot.send_message(chat_id, "⚠️ Команда не найдена.").await?;
        dialogue.exit().await?;
        return Ok(());
    };

    send_category_menu(&bot, chat_id, &team.name).await?;
    dialogue.update(State::ScoreSelectCategory { team_id }).await?;
    Ok(())
}

/// Выбор категории: фиксированная ставка идёт сразу на подтверждение,
/// иначе показываем варианты количества баллов
pub async fn select_category(
    bot: Bot,
    dialogue: BotDialogue,
    q: CallbackQuery,
    team_id: i64,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };
    let data = q.data.as_deref().unwrap_or_default();

    if data == "score_stop" {
        return finish_wizard(&bot, &dialogue, chat_id).await;
    }
    let Some(key) = data.strip_prefix("score_cat:") else {
        return Ok(());
    };
    let Some(category) = categories::by_key(key) else {
        bot.send_message(chat_id, "❌ Неизвестная категория.").await?;
        return Ok(());
    };

    match category.points {
        PointSpec::Fixed(points) => {
            send_confirm_prompt(&bot, chat_id, category.title, points).await?;
            dialogue
                .update(State::ScoreConfirm { team_id, category: category.key.to_string(), points })
                .await?;
        }
        PointSpec::Choice(_) => {
            bot.send_message(chat_id, format!("Выберите, сколько баллов начислить за <b>{}</b>:", category.title))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::points_kb(category.points))
                .await?;
            dialogue
                .update(State::ScoreSelectPoints { team_id, category: category.key.to_string() })
                .await?;
        }
    }
    Ok(())
}

/// Выбор количества баллов для категорий без фиксированной ставки
pub async fn select_points(
    bot: Bot,
    dialogue: BotDialogue,
    q: CallbackQuery,
    (team_id, category): (i64, String),
    deps: HandlerDeps,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };
    let data = q.data.as_deref().unwrap_or_default();

    match data {
        "score_stop" => return finish_wizard(&bot, &dialogue, chat_id).await,
        "score_cancel" => {
            return back_to_categories(&bot, &dialogue, chat_id, team_id, &deps).await;
        }
        _ => {}
    }

    let Some(points) = data.strip_prefix("score_points:").and_then(|s| s.parse::<i64>().ok()) else {
        return Ok(());
    };
    send_confirm_prompt(&bot, chat_id, categories::title(&category), points).await?;
    dialogue.update(State::ScoreConfirm { team_id, category, points }).await?;
    Ok(())
}

/// Подтверждение начисления
pub async fn confirm_score(
    bot: Bot,
    dialogue: BotDialogue,
    q: CallbackQuery,
    (team_id, category, points): (i64, String, i64),
    deps: HandlerDeps,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };

    match q.data.as_deref().unwrap_or_default() {
        "score_stop" => return finish_wizard(&bot, &dialogue, chat_id).await,
        "score_reject" => {
            return back_to_categories(&bot, &dialogue, chat_id, team_id, &deps).await;
        }
        "score_confirm" => {}
        _ => return Ok(()),
    }

    let conn = get_connection(&deps.db_pool)?;
    let Some(team) = db::get_team(&conn, team_id)? else {
        bot.send_message(chat_id, "⚠️ Команда не найдена, начисление отменено.").await?;
        dialogue.exit().await?;
        return Ok(());
    };

    db::add_points(&conn, team_id, &category, points)?;
    log::info!(
        "🎯 Начислены баллы: {} | Категория: '{}' → Команда: '{}' (ID {}) | Субботник ID: {}",
        points,
        category,
        team.name,
        team.id,
        team.event_id
    );

    bot.send_message(
        chat_id,
        format!(
            "✅ Баллы начислены: <b>{}</b> по категории <b>{}</b> команде <b>{}</b>.",
            points,
            categories::title(&category),
            esc(&team.name)
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    // сразу предлагаем следующую категорию для той же команды
    send_category_menu(&bot, chat_id, &team.name).await?;
    dialogue.update(State::ScoreSelectCategory { team_id }).await?;
    Ok(())
}

/// Завершение мастера
async fn finish_wizard(bot: &Bot, dialogue: &BotDialogue, chat_id: ChatId) -> HandlerResult {
    dialogue.exit().await?;
    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("score_start"), keyboards::back_menu_row()]);
    bot.send_message(chat_id, "✅ Проставление баллов завершено.\nМожешь вернуться в меню или продолжить работу.")
        .reply_markup(kb)
        .await?;
    Ok(())
}

/// Возврат к меню категорий после отмены или отклонения
async fn back_to_categories(
    bot: &Bot,
    dialogue: &BotDialogue,
    chat_id: ChatId,
    team_id: i64,
    deps: &HandlerDeps,
) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let Some(team) = db::get_team(&conn, team_id)? else {
        bot.send_message(chat_id, "⚠️ Команда не найдена.").await?;
        dialogue.exit().await?;
        return Ok(());
    };
    send_category_menu(bot, chat_id, &team.name).await?;
    dialogue.update(State::ScoreSelectCategory { team_id }).await?;
    Ok(())
}

async fn send_category_menu(bot: &Bot, chat_id: ChatId, team_name: &str) -> HandlerResult {
    bot.send_message(
        chat_id,
        format!("Выберите категорию для начисления баллов команде <b>{}</b>:", esc(team_name)),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::categories_kb())
    .await?;
    Ok(())
}

async fn send_confirm_prompt(bot: &Bot, chat_id: ChatId, category_title: &str, points: i64) -> HandlerResult {
    bot.send_message(
        chat_id,
        format!("Начислить <b>{}</b> баллов по категории <b>{}</b>?", points, category_title),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::confirm_kb())
    .await?;
    Ok(())
}

/// Страница списка команд: новое сообщение на входе в шаг, редактирование
/// на месте при листании
async fn render_team_page(
    bot: &Bot,
    chat_id: ChatId,
    edit: Option<MessageId>,
    teams: &[db::Team],
    page: usize,
) -> HandlerResult {
    let per_page = config::pages::WIZARD_TEAMS;
    let pages = keyboards::total_pages(teams.len(), per_page).max(1);
    let page = page.clamp(1, pages);

    let mut rows: Vec<Vec<InlineKeyboardButton>> = keyboards::page_slice(teams, page, per_page)
        .iter()
        .map(|t| vec![cb(t.name.clone(), format!("score_team:{}", t.id))])
        .collect();
    if let Some(nav) = keyboards::nav_row(page, pages, "score_page") {
        rows.push(nav);
    }
    rows.push(vec![cb("🚫 Завершить", "score_stop")]);
    let kb = InlineKeyboardMarkup::new(rows);

    let text = if pages > 1 {
        format!("Выберите команду для начисления баллов (страница {page}/{pages}):")
    } else {
        "Выберите команду для начисления баллов:".to_string()
    };

    match edit {
        Some(message_id) => edit_or_resend(bot, chat_id, message_id, &text, kb).await,
        None => {
            bot.send_message(chat_id, text).reply_markup(kb).await?;
            Ok(())
        }
    }
}
