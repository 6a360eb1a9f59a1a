//! Экспорт итогов субботника в Excel
//!
//! Файл пишется во временную директорию, отправляется документом и сразу
//! удаляется.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::Workbook;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId};

use super::{edit_or_resend, HandlerDeps, HandlerResult};
use crate::core::categories::CATEGORIES;
use crate::core::config;
use crate::core::error::AppResult;
use crate::storage::db::{self, get_connection, Score, Team};
use crate::telegram::{cb, keyboards};

/// Строка листа экспорта: баллы в порядке списка категорий
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub name: String,
    pub points: Vec<i64>,
    pub total: i64,
}

/// Собирает строки листа: по убыванию суммы, при равенстве сумм в порядке
/// создания команд
pub fn build_export_rows(teams: &[(Team, Vec<Score>)]) -> Vec<ExportRow> {
    let mut ordered: Vec<&(Team, Vec<Score>)> = teams.iter().collect();
    ordered.sort_by_key(|(team, scores)| (Reverse(scores.iter().map(|s| s.points).sum::<i64>()), team.id));

    ordered
        .into_iter()
        .map(|(team, scores)| {
            let by_category: HashMap<&str, i64> =
                scores.iter().map(|s| (s.category.as_str(), s.points)).collect();
            let points: Vec<i64> = CATEGORIES.iter().map(|c| by_category.get(c.key).copied().unwrap_or(0)).collect();
            ExportRow {
                name: team.name.clone(),
                points,
                total: scores.iter().map(|s| s.points).sum(),
            }
        })
        .collect()
}

/// Сколько команд получили баллы по каждой категории, в порядке списка
/// категорий
pub fn category_row_counts(teams: &[(Team, Vec<Score>)]) -> Vec<usize> {
    CATEGORIES
        .iter()
        .map(|c| {
            teams
                .iter()
                .filter(|(_, scores)| scores.iter().any(|s| s.category == c.key))
                .count()
        })
        .collect()
}

/// Пишет книгу Excel с итогами
pub fn write_workbook(path: &Path, rows: &[ExportRow], counts: &[usize]) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Отчёт")?;

    sheet.write_string(0, 0, "Команда")?;
    for (idx, category) in CATEGORIES.iter().enumerate() {
        sheet.write_string(0, (idx + 1) as u16, category.title)?;
    }
    let total_col = (CATEGORIES.len() + 1) as u16;
    sheet.write_string(0, total_col, "Всего баллов")?;

    sheet.set_column_width(0, 40)?;
    for idx in 1..=CATEGORIES.len() {
        sheet.set_column_width(idx as u16, 28)?;
    }
    sheet.set_column_width(total_col, 16)?;

    let mut row_idx: u32 = 1;
    for row in rows {
        sheet.write_string(row_idx, 0, &row.name)?;
        for (idx, points) in row.points.iter().enumerate() {
            sheet.write_number(row_idx, (idx + 1) as u16, *points as f64)?;
        }
        sheet.write_number(row_idx, total_col, row.total as f64)?;
        row_idx += 1;
    }

    // сводка внизу: сколько команд отметилось в каждой категории
    row_idx += 1;
    sheet.write_string(row_idx, 0, "ИТОГО по категориям:")?;
    row_idx += 1;
    for (category, count) in CATEGORIES.iter().zip(counts) {
        sheet.write_string(row_idx, 0, category.title)?;
        sheet.write_number(row_idx, 1, *count as f64)?;
        row_idx += 1;
    }

    workbook.save(path)?;
    Ok(())
}

/// Предлагает выбрать субботник для экспорта
pub async fn show_event_picker(bot: &Bot, chat_id: ChatId, message_id: MessageId, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let events = db::list_events(&conn)?;

    if events.is_empty() {
        let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("view_database")]);
        edit_or_resend(bot, chat_id, message_id, "❗ Нет доступных субботников.", kb).await?;
        return Ok(());
    }

    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|e| vec![cb(e.title.clone(), format!("export_event:{}", e.id))])
        .collect();
    rows.push(keyboards::back_row("view_database"));

    edit_or_resend(bot, chat_id, message_id, "Выберите субботник для экспорта:", InlineKeyboardMarkup::new(rows))
        .await
}

/// Выгружает итоги выбранного субботника файлом Excel
pub async fn export_event(bot: &Bot, chat_id: ChatId, event_id: i64, deps: &HandlerDeps) -> HandlerResult {
    let conn = get_connection(&deps.db_pool)?;
    let Some(event) = db::get_event(&conn, event_id)? else {
        bot.send_message(chat_id, "⚠️ Субботник не найден.").await?;
        return Ok(());
    };
    let teams = db::event_teams_with_scores(&conn, event_id)?;
    if teams.is_empty() {
        bot.send_message(chat_id, "❗ У этого субботника пока нет команд.").await?;
        return Ok(());
    }

    let rows = build_export_rows(&teams);
    let counts = category_row_counts(&teams);

    let path = Path::new(config::TEMP_FILES_DIR.as_str()).join(format!("event_{event_id}_report.xlsx"));
    write_workbook(&path, &rows, &counts)?;

    let kb = InlineKeyboardMarkup::new(vec![keyboards::back_row("view_database"), keyboards::back_menu_row()]);
    let send_result = bot
        .send_document(chat_id, InputFile::file(path.clone()))
        .caption(format!("📊 Итоги субботника «{}»", event.title))
        .reply_markup(kb)
        .await;
    // файл временный, убираем его и при неудачной отправке
    let _ = std::fs::remove_file(&path);
    send_result?;

    log::info!("📤 Экспорт Excel: Субботник '{}' (ID {})", event.title, event.id);
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
    fn test_export_rows_ordered_and_filled_per_category() {
        let teams = vec![
            (team(1, "Альфа"), vec![score(1, "bag_mixed", 10)]),
            (team(2, "Бета"), vec![score(2, "bag_mixed", 10), score(2, "bulky", 20)]),
        ];
        let rows = build_export_rows(&teams);

        assert_eq!(rows[0].name, "Бета");
        assert_eq!(rows[0].total, 30);
        assert_eq!(rows[0].points.len(), CATEGORIES.len());
        assert_eq!(rows[0].points[0], 10);
        assert_eq!(rows[1].name, "Альфа");
        assert_eq!(rows[1].points.iter().sum::<i64>(), 10);
    }

    #[test]
    fn test_export_rows_tie_broken_by_team_id() {
        let teams = vec![
            (team(9, "Поздняя"), vec![score(9, "bag_mixed", 10)]),
            (team(3, "Ранняя"), vec![score(3, "bag_mixed", 10)]),
        ];
        let rows = build_export_rows(&teams);

        assert_eq!(rows[0].name, "Ранняя");
        assert_eq!(rows[1].name, "Поздняя");
    }

    #[test]
    fn test_category_row_counts() {
        let teams = vec![
            (team(1, "Альфа"), vec![score(1, "bag_mixed", 10), score(1, "bulky", 5)]),
            (team(2, "Бета"), vec![score(2, "bag_mixed", 10)]),
            (team(3, "Гамма"), vec![]),
        ];
        let counts = category_row_counts(&teams);

        assert_eq!(counts.len(), CATEGORIES.len());
        assert_eq!(counts[0], 2);
        let bulky_idx = CATEGORIES.iter().position(|c| c.key == "bulky").unwrap();
        assert_eq!(counts[bulky_idx], 1);
    }

    #[test]
    fn test_write_workbook_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        let teams = vec![(team(1, "Альфа"), vec![score(1, "bag_mixed", 10)])];
        let rows = build_export_rows(&teams);
        let counts = category_row_counts(&teams);
        write_workbook(&path, &rows, &counts).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
