//! Дерево обработчиков диспетчера

use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::dptree::{self, case};
use teloxide::prelude::*;

use super::{admin, events, menu, score, score_manage, start, teams, unhandled_callback, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::state::State;

/// Собирает дерево обработчиков: команды, текстовые шаги сценариев и
/// callback-кнопки
pub fn schema() -> UpdateHandler<HandlerError> {
    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start::handle_start))
        .branch(case![Command::CreateEvent].endpoint(events::command_create_event))
        .branch(case![Command::AddTeam].endpoint(teams::command_add_team))
        .branch(case![Command::Score].endpoint(score::command_score))
        .branch(case![Command::AdjustScore].endpoint(score_manage::command_adjust_score));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![State::AwaitAdminUsername].endpoint(admin::receive_username))
        .branch(case![State::AwaitEventTitle].endpoint(events::receive_title))
        .branch(case![State::AwaitTeamName { event_id }].endpoint(teams::receive_team_name))
        .branch(case![State::AdjustAwaitAmount { team_id, category }].endpoint(score_manage::receive_amount));

    // ветка меню стоит раньше веток состояний: её кнопки должны работать
    // из любого места, в том числе посреди сценария
    let callback_handler = Update::filter_callback_query()
        .branch(
            dptree::filter(|q: CallbackQuery| q.data.as_deref().map(menu::is_menu_data).unwrap_or(false))
                .endpoint(menu::handle_menu_callback),
        )
        .branch(case![State::AddTeamSelectEvent].endpoint(teams::select_event))
        .branch(case![State::ScoreSelectEvent].endpoint(score::select_event))
        .branch(case![State::ScoreSelectTeam { event_id }].endpoint(score::select_team))
        .branch(case![State::ScoreSelectCategory { team_id }].endpoint(score::select_category))
        .branch(case![State::ScoreSelectPoints { team_id, category }].endpoint(score::select_points))
        .branch(case![State::ScoreConfirm { team_id, category, points }].endpoint(score::confirm_score))
        .branch(case![State::AdjustSelectEvent].endpoint(score_manage::select_event))
        .branch(case![State::AdjustSelectTeam].endpoint(score_manage::select_team))
        .branch(case![State::AdjustPickCategory { team_id }].endpoint(score_manage::pick_category))
        .endpoint(unhandled_callback);

    dialogue::enter::<Update, InMemStorage<State>, State, _>()
        .branch(message_handler)
        .branch(callback_handler)
}
