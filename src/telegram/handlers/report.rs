//! Отчёт по субботнику: суммы баллов команд по убыванию

use std::cmp::Reverse;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};

use super::{HandlerDeps, HandlerResult};
use crate::core::categories;
use crate::storage::db::{self, get_connection, Score, Team};
use crate::telegram::{cb, esc, keyboards};

/// Строка отчёта по одной команде
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamReport {
    pub team_id: i64,
    pub name: String,
    pub scores: Vec<(String, i64)>,
    pub total: i64,
}

/// Собирает и сортирует строки отчёта: по убыванию суммы, при равенстве
/// сумм в порядке создания команд
pub fn build_report_rows(teams: Vec<(Team, Vec<Score>)>) -> Vec<TeamReport> {
    let mut rows: Vec<TeamReport> = teams
        .into_iter()
        .map(|(team, scores)| {
            let total = scores.iter().map(|s| s.points).sum();
            TeamReport {
                team_id: team.id,
                name: team.name,
                scores: scores.into_iter().map(|s| (s.category, s.points)).collect(),
                total,
            }
        })
        .collect();
    rows.sort_by_key(|r| (Reverse(r.total), r.team_id));
    rows
}

/// Форматирует отчёт в HTML
pub fn format_report(rows: &[TeamReport]) -> String {
    let mut text = String::from("<b>📊 Итоги субботника:</b>\n\n");
    for (idx, row) in rows.iter().enumerate() {
        text.push_str(&format!("<b>{}. {}</b>\n", idx + 1, esc(&row.name)));
        if row.scores.is_empty() {
            text.push_str("— Нет начисленных баллов\n\n");
            continue;
        }
        for (category, points) in &row.scores {
            text.push_str(&format!("{}: {} баллов\n", categories::title(category), points));
        }
        text.push_str(&format!("<b>Итого: {} баллов</b>\n\n", row.total));
    }
    text
}

/// Предлагает выбрать субботник для отчёта
pub async fn show_event_picker(bot: &Bot, chat_id: ChatId, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let events = db::list_events(&conn)?;

    if events.is_empty() {
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("view_database")]);
        bot.send_message(chat_id, "❗ Нет доступных субботников.").reply_markup(kb).await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|e| vec![cb(e.title.clone(), format!("report_event:{}", e.id))])
        .collect();
    rows.push(keyboards::back_row("view_database"));

    bot.send_message(chat_id, "Выберите субботник для отчёта:")
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Отчёт по выбранному субботнику
pub async fn show_report(bot: &Bot, chat_id: ChatId, event_id: i64, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let teams = db::event_teams_with_scores(&conn, event_id)?;
    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("view_database")]);

    if teams.is_empty() {
        bot.send_message(chat_id, "❗ В этом субботнике пока нет команд.").reply_markup(kb).await?;
        return Ok(());
    }

    let rows = build_report_rows(teams);
    bot.send_message(chat_id, format_report(&rows))
        .parse_mode(ParseMode::Html)
        .reply_markup(kb)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn team(id: i64, name: &str) -> Team {
        Team { id, name: name.to_string(), event_id: 1 }
    }

    fn score(team_id: i64, category: &str, points: i64) -> Score {
        Score { team_id, category: category.to_string(), points }
    }

    #[test]
    fn test_rows_sorted_by_total_descending() {
        let rows = build_report_rows(vec![
            (team(1, "Альфа"), vec![score(1, "bag_mixed", 10)]),
            (team(2, "Бета"), vec![score(2, "bag_mixed", 10), score(2, "activity", 5)]),
            (team(3, "Гамма"), vec![]),
        ]);

        let order: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["Бета", "Альфа", "Гамма"]);
        assert_eq!(rows[0].total, 15);
        assert_eq!(rows[2].total, 0);
    }

    #[test]
    fn test_equal_totals_keep_creation_order() {
        let rows = build_report_rows(vec![
            (team(7, "Семёрка"), vec![score(7, "bag_sorted", 15)]),
            (team(2, "Двойка"), vec![score(2, "bag_sorted", 15)]),
            (team(5, "Пятёрка"), vec![score(5, "bag_sorted", 15)]),
        ]);

        let ids: Vec<i64> = rows.iter().map(|r| r.team_id).collect();
        assert_eq!(ids, vec![2, 5, 7]);
    }

    #[test]
    fn test_format_report_marks_teams_without_scores() {
        let rows = build_report_rows(vec![(team(1, "Пустая"), vec![])]);
        let text = format_report(&rows);

        assert!(text.contains("<b>1. Пустая</b>"));
        assert!(text.contains("Нет начисленных баллов"));
        assert!(!text.contains("Итого"));
    }

    #[test]
    fn test_format_report_escapes_team_names() {
        let rows = build_report_rows(vec![(team(1, "Дружина <1>"), vec![score(1, "bag_mixed", 10)])]);
        let text = format_report(&rows);

        assert!(text.contains("Дружина &lt;1&gt;"));
        assert!(text.contains("<b>Итого: 10 баллов</b>"));
    }

    #[test]
    fn test_unknown_category_shown_by_raw_key() {
        let rows = build_report_rows(vec![(team(1, "Альфа"), vec![score(1, "legacy_key", 3)])]);
        let text = format_report(&rows);

        assert!(text.contains("legacy_key: 3 баллов"));
    }
}
