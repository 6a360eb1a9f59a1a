//! Inline keyboard builders and pagination arithmetic

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::cb;
use crate::core::categories::{self, PointSpec};

/// Главное меню администратора
pub fn main_menu_kb() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb("➕ Добавить админа", "add_admin_instruction")],
        vec![cb("🗓️ Создать субботник", "create_event")],
        vec![cb("👥 Добавить команду", "add_team")],
        vec![cb("📂 Просмотреть базу данных", "view_database")],
        vec![cb("📊 Проставить баллы", "score_start")],
        vec![cb("⚙️ Управление баллами", "adjust_score_start")],
    ])
}

/// Подменю просмотра базы данных
pub fn view_database_kb() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb("📄 Посмотреть отчёт", "view_report")],
        vec![cb("📊 Экспорт в Excel", "export_excel")],
        vec![cb("📋 Все субботники", "view_events")],
        vec![cb("👥 Все команды", "view_teams")],
        back_menu_row(),
    ])
}

/// Кнопка возврата в главное меню
pub fn back_menu_row() -> Vec<InlineKeyboardButton> {
    vec![cb("🏠 Главное меню", "back_to_main")]
}

/// Кнопка "Назад" с произвольным callback
pub fn back_row(callback_to_return: &str) -> Vec<InlineKeyboardButton> {
    vec![cb("🔙 Назад", callback_to_return.to_string())]
}

/// Кнопка "Добавить еще команду"
pub fn add_more_row(callback_to_return: &str) -> Vec<InlineKeyboardButton> {
    vec![cb("Добавить еще команду", callback_to_return.to_string())]
}

/// Меню категорий мастера начисления с кнопкой завершения
pub fn categories_kb() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = categories::CATEGORIES
        .iter()
        .map(|c| vec![cb(c.title, format!("score_cat:{}", c.key))])
        .collect();
    rows.push(vec![cb("🚫 Завершить", "score_stop")]);
    InlineKeyboardMarkup::new(rows)
}

/// Вторичное меню с вариантами баллов, по три кнопки в ряд
pub fn points_kb(spec: PointSpec) -> InlineKeyboardMarkup {
    let values: &[i64] = match spec {
        PointSpec::Choice(values) => values,
        PointSpec::Fixed(_) => &[],
    };
    let mut rows: Vec<Vec<InlineKeyboardButton>> = values
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .map(|p| cb(p.to_string(), format!("score_points:{}", p)))
                .collect()
        })
        .collect();
    rows.push(vec![cb("↩️ Назад", "score_cancel")]);
    InlineKeyboardMarkup::new(rows)
}

/// Подтверждение начисления баллов
pub fn confirm_kb() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        cb("✅ Подтвердить", "score_confirm"),
        cb("🚫 Отклонить", "score_reject"),
    ]])
}

/// Number of pages needed for `total` items, `per_page` per page
pub fn total_pages(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page)
}

/// Items belonging to a 1-based page
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let start = page.saturating_sub(1) * per_page;
    let end = (start + per_page).min(items.len());
    if start >= items.len() {
        &[]
    } else {
        &items[start..end]
    }
}

/// Navigation row: "previous" only when not on the first page, "next" only
/// when not on the last. Returns None when neither applies.
pub fn nav_row(page: usize, total_pages: usize, callback_base: &str) -> Option<Vec<InlineKeyboardButton>> {
    let mut buttons = Vec::new();
    if page > 1 {
        buttons.push(cb("⬅️ Назад", format!("{}:{}", callback_base, page - 1)));
    }
    if page < total_pages {
        buttons.push(cb("➡️ Далее", format!("{}:{}", callback_base, page + 1)));
    }
    if buttons.is_empty() {
        None
    } else {
        Some(buttons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(45, 10), 5);
    }

    #[test]
    fn test_pages_partition_all_items_exactly() {
        let items: Vec<usize> = (0..45).collect();
        let per_page = 10;
        let pages = total_pages(items.len(), per_page);

        let mut collected = Vec::new();
        for page in 1..=pages {
            collected.extend_from_slice(page_slice(&items, page, per_page));
        }
        assert_eq!(collected, items);
    }

    #[test]
    fn test_page_slice_out_of_range_is_empty() {
        let items = [1, 2, 3];
        assert!(page_slice(&items, 5, 2).is_empty());
    }

    #[test]
    fn test_nav_row_first_page_has_no_previous() {
        let row = nav_row(1, 3, "view_teams").unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row[0].text, "➡️ Далее");
    }

    #[test]
    fn test_nav_row_last_page_has_no_next() {
        let row = nav_row(3, 3, "view_teams").unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row[0].text, "⬅️ Назад");
    }

    #[test]
    fn test_nav_row_middle_page_has_both() {
        let row = nav_row(2, 3, "view_teams").unwrap();
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_nav_row_single_page_is_empty() {
        assert!(nav_row(1, 1, "view_teams").is_none());
    }

    #[test]
    fn test_points_kb_three_per_row() {
        let kb = points_kb(PointSpec::Choice(&[5, 10, 15, 20, 25, 30]));
        // two rows of three values plus the back row
        assert_eq!(kb.inline_keyboard.len(), 3);
        assert_eq!(kb.inline_keyboard[0].len(), 3);
        assert_eq!(kb.inline_keyboard[1].len(), 3);
        assert_eq!(kb.inline_keyboard[2].len(), 1);
    }

    #[test]
    fn test_categories_kb_ends_with_stop() {
        let kb = categories_kb();
        let last_row = kb.inline_keyboard.last().unwrap();
        assert_eq!(last_row[0].text, "🚫 Завершить");
    }
}
