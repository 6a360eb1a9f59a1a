//! Маршрутизация кнопок меню
//!
//! Эти кнопки живут вне сценариев и должны работать из любого состояния
//! диалога, поэтому в схеме их ветка стоит раньше веток состояний.

use teloxide::prelude::*;

use super::{
    admin, callback_chat, events, export, report, score, score_manage, start, teams, HandlerDeps, HandlerResult,
};
use crate::telegram::state::BotDialogue;

/// Относится ли callback к глобальному меню
pub fn is_menu_data(data: &str) -> bool {
    matches!(
        data,
        "back_to_main"
            | "view_database"
            | "add_admin_instruction"
            | "create_event"
            | "add_team"
            | "score_start"
            | "adjust_score_start"
            | "view_report"
            | "view_events"
            | "export_excel"
            | "view_teams"
    ) || data.starts_with("view_teams:")
        || data.starts_with("report_event:")
        || data.starts_with("export_event:")
}

/// Единая точка обработки кнопок меню
pub async fn handle_menu_callback(
    bot: Bot,
    dialogue: BotDialogue,
    q: CallbackQuery,
    deps: HandlerDeps,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;
    let Some((chat_id, message_id)) = callback_chat(&q) else {
        return Ok(());
    };
    let data = q.data.as_deref().unwrap_or_default();

    match data {
        "back_to_main" => start::back_to_main(&bot, &dialogue, chat_id, message_id).await,
        "view_database" => start::show_view_database(&bot, chat_id, message_id).await,
        "add_admin_instruction" => admin::ask_username(&bot, &dialogue, chat_id).await,
        "create_event" => events::start_create_event(&bot, &dialogue, chat_id).await,
        "add_team" => teams::start_add_team(&bot, &dialogue, chat_id, &deps).await,
        "score_start" => score::start_wizard(&bot, &dialogue, chat_id, &deps).await,
        "adjust_score_start" => score_manage::start_adjust(&bot, &dialogue, chat_id, &deps).await,
        "view_report" => report::show_event_picker(&bot, chat_id, &deps).await,
        "view_events" => events::show_events(&bot, chat_id, &deps).await,
        "export_excel" => export::show_event_picker(&bot, chat_id, message_id, &deps).await,
        "view_teams" => teams::show_team_browser(&bot, chat_id, message_id, 1, &deps).await,
        _ => {
            if let Some(page) = data.strip_prefix("view_teams:").and_then(|s| s.parse::<usize>().ok()) {
                teams::show_team_browser(&bot, chat_id, message_id, page, &deps).await
            } else if let Some(event_id) = data.strip_prefix("report_event:").and_then(|s| s.parse::<i64>().ok()) {
                report::show_report(&bot, chat_id, event_id, &deps).await
            } else if let Some(event_id) = data.strip_prefix("export_event:").and_then(|s| s.parse::<i64>().ok()) {
                export::export_event(&bot, chat_id, event_id, &deps).await
            } else {
                Ok(())
            }
        }
    }
}
