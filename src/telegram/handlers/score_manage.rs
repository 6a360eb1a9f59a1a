//! Корректировка начисленных баллов
//!
//! Админ выбирает субботник и команду, видит текущие баллы по категориям и
//! вычитает нужное количество. Если после вычитания остаток не положительный,
//! запись категории удаляется целиком.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};

use super::{callback_chat, require_admin, HandlerDeps, HandlerResult};
use crate::core::categories;
use crate::storage::db::{self, get_connection, SubtractOutcome};
use crate::telegram::{cb, esc, keyboards};
use crate::telegram::state::{BotDialogue, State};

/// Точка входа команды /adjust_score
pub async fn command_adjust_score(bot: Bot, dialogue: BotDialogue, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    if !require_admin(&bot, conn, msg.chat.id).await? {
        return Ok(());
    }
    start_adjust(&bot, &dialogue, msg.chat.id, &deps).await
}

/// Первый шаг: выбор субботника
pub async fn start_adjust(bot: &Bot, dialogue: &BotDialogue, chat_id: ChatId, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let events = db::list_events(&conn)?;

    if events.is_empty() {
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_menu_row()]);
        bot.send_message(chat_id, "❗ Субботники пока не созданы.").reply_markup(kb).await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|e| vec![cb(e.title.clone(), format!("adjust_event:{}", e.id))])
        .collect();
    rows.push(keyboards::back_menu_row());

    bot.send_message(chat_id, "Выберите субботник:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    dialogue.update(State::AdjustSelectEvent).await?;
    Ok(())
}

/// Выбор субботника → список его команд
pub async fn select_event(bot: Bot, dialogue: BotDialogue, q: CallbackQuery, deps: HandlerDeps) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };
    let Some(event_id) = q.data.as_deref().and_then(|d| d.strip_prefix("adjust_event:")).and_then(|s| s.parse::<i64>().ok())
    else {
        return Ok(());
    };

    let conn = get_connection(&deps.db_pool)?;
    let teams = db::list_event_teams(&conn, event_id)?;
    if teams.is_empty() {
        bot.send_message(chat_id, "❗ В этом субботнике нет команд.").await?;
        dialogue.exit().await?;
        return Ok(());
    }

    let rows: Vec<Vec<InlineKeyboardButton>> = teams
        .iter()
        .map(|t| vec![cb(t.name.clone(), format!("adjust_team:{}", t.id))])
        .collect();
    bot.send_message(chat_id, "Выберите команду:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    dialogue.update(State::AdjustSelectTeam).await?;
    Ok(())
}

/// Выбор команды → сводка её баллов
pub async fn select_team(bot: Bot, dialogue: BotDialogue, q: CallbackQuery, deps: HandlerDeps) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };
    let Some(team_id) = q.data.as_deref().and_then(|d| d.strip_prefix("adjust_team:")).and_then(|s| s.parse::<i64>().ok())
    else {
        return Ok(());
    };

    render_team_scores(&bot, &dialogue, chat_id, team_id, &deps).await
}

/// Выбор категории для вычитания либо выход из сценария
pub async fn pick_category(bot: Bot, dialogue: BotDialogue, q: CallbackQuery, team_id: i64) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, _)) = callback_chat(&q) else {
        return Ok(());
    };
    let data = q.data.as_deref().unwrap_or_default();

    if data == "adjust_cancel" {
        dialogue.exit().await?;
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_menu_row()]);
        bot.send_message(chat_id, "✅ Управление баллами завершено.").reply_markup(kb).await?;
        return Ok(());
    }
    let Some(key) = data.strip_prefix("adjust_delete:") else {
        return Ok(());
    };

    // кнопки строятся из строк БД, поэтому ключ может быть и устаревшим,
    // не входящим в текущий список категорий; показываем его как есть
    bot.send_message(chat_id, format!("Введите, сколько баллов вычесть из категории <b>{}</b>:", categories::title(key)))
        .parse_mode(ParseMode::Html)
        .await?;
    dialogue
        .update(State::AdjustAwaitAmount { team_id, category: key.to_string() })
        .await?;
    Ok(())
}

/// Принимает количество баллов к вычитанию
pub async fn receive_amount(
    bot: Bot,
    dialogue: BotDialogue,
    msg: Message,
    (team_id, category): (i64, String),
    deps: HandlerDeps,
) -> HandlerResult {
    let amount = msg.text().map(str::trim).and_then(|t| t.parse::<i64>().ok()).filter(|a| *a > 0);
    let Some(amount) = amount else {
        bot.send_message(msg.chat.id, "❗ Введите положительное число.").await?;
        return Ok(());
    };

    let conn = get_connection(&deps.db_pool)?;
    match db::subtract_points(&conn, team_id, &category, amount)? {
        SubtractOutcome::NotFound => {
            bot.send_message(msg.chat.id, "⚠️ Баллы по этой категории не найдены.").await?;
            dialogue.exit().await?;
            return Ok(());
        }
        SubtractOutcome::Removed => {
            log::info!("🔻 Вычтено {} баллов из '{}' команды ID {} (категория удалена)", amount, category, team_id);
            bot.send_message(
                msg.chat.id,
                format!("✅ Категория <b>{}</b> полностью обнулена и удалена.", categories::title(&category)),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        SubtractOutcome::Remaining(left) => {
            log::info!("🔻 Вычтено {} баллов из '{}' команды ID {} (осталось {})", amount, category, team_id, left);
            bot.send_message(
                msg.chat.id,
                format!(
                    "✅ Вычтено <b>{}</b> баллов из категории <b>{}</b>. Осталось: <b>{}</b>.",
                    amount,
                    categories::title(&category),
                    left
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
    }

    render_team_scores(&bot, &dialogue, msg.chat.id, team_id, &deps).await
}

/// Сводка баллов команды с кнопками вычитания по категориям
async fn render_team_scores(
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
    let scores = db::team_scores(&conn, team_id)?;
    if scores.is_empty() {
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_menu_row()]);
        bot.send_message(chat_id, "У этой команды пока нет баллов.").reply_markup(kb).await?;
        dialogue.exit().await?;
        return Ok(());
    }

    let mut text = format!("🔧 Управление баллами — команда <b>{}</b>\n\n", esc(&team.name));
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for score in &scores {
        let title = categories::title(&score.category);
        text.push_str(&format!("{}: <b>{}</b> баллов\n", title, score.points));
        rows.push(vec![cb(format!("❌ Удалить: {title}"), format!("adjust_delete:{}", score.category))]);
    }
    rows.push(vec![cb("↩️ Завершить", "adjust_cancel")]);

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    dialogue.update(State::AdjustPickCategory { team_id }).await?;
    Ok(())
}
