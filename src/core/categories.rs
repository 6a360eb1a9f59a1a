//! Статическая таблица конкурсных категорий.
//!
//! Каждая категория либо даёт фиксированное количество баллов, либо
//! предлагает выбор из нескольких дискретных значений (ручной выбор
//! во вторичном меню мастера начисления).

/// Point specification of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSpec {
    /// Category always grants the same number of points
    Fixed(i64),
    /// Category presents a secondary menu of selectable point values
    Choice(&'static [i64]),
}

/// A scoring dimension of the competition
#[derive(Debug, Clone, Copy)]
pub struct Category {
    /// Stable key stored in the scores table and in callback data
    pub key: &'static str,
    /// Display label shown in menus, reports and the export
    pub title: &'static str,
    pub points: PointSpec,
}

/// All categories, in menu order
pub static CATEGORIES: &[Category] = &[
    Category {
        key: "bag_mixed",
        title: "🗑 Мешок смешанного мусора",
        points: PointSpec::Fixed(10),
    },
    Category {
        key: "bag_sorted",
        title: "♻️ Мешок раздельного мусора",
        points: PointSpec::Fixed(15),
    },
    Category {
        key: "bulky",
        title: "🛋 Крупногабаритный мусор",
        points: PointSpec::Choice(&[5, 10, 15, 20, 25, 30]),
    },
    Category {
        key: "creative",
        title: "🎨 Творческий конкурс",
        points: PointSpec::Choice(&[5, 10, 15, 20, 25, 30]),
    },
    Category {
        key: "activity",
        title: "🔥 Активность команды",
        points: PointSpec::Choice(&[1, 2, 3, 4, 5, 10]),
    },
];

/// Looks up a category by its stable key
pub fn by_key(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Display label for a category key; falls back to the raw key for
/// score rows written under a key no longer present in the table
pub fn title(key: &str) -> &str {
    match by_key(key) {
        Some(category) => category.title,
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_key_finds_every_category() {
        for category in CATEGORIES {
            assert_eq!(by_key(category.key).map(|c| c.title), Some(category.title));
        }
    }

    #[test]
    fn test_unknown_key_falls_back_to_raw_key() {
        assert!(by_key("retired_category").is_none());
        assert_eq!(title("retired_category"), "retired_category");
    }

    #[test]
    fn test_keys_are_unique() {
        for (i, a) in CATEGORIES.iter().enumerate() {
            for b in &CATEGORIES[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_choice_lists_are_non_empty() {
        for category in CATEGORIES {
            if let PointSpec::Choice(values) = category.points {
                assert!(!values.is_empty(), "{} has an empty choice list", category.key);
                assert!(values.iter().all(|v| *v > 0));
            }
        }
    }
}
