//! Integration tests for the storage layer
//!
//! Run with: cargo test --test storage_test

use std::sync::Arc;

use pretty_assertions::assert_eq;

use subbotnik_bot::storage::db::{self, SubtractOutcome};
use subbotnik_bot::storage::{create_pool, get_connection, DbPool};

fn test_pool() -> (tempfile::TempDir, Arc<DbPool>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.sqlite");
    let pool = create_pool(db_path.to_str().expect("Non-UTF8 temp path")).expect("Failed to create test database");
    (dir, Arc::new(pool))
}

#[test]
fn test_user_lifecycle_and_admin_promotion() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    db::create_user(&conn, 100, Some("Ivanov"), "Иван", false).unwrap();

    let user = db::get_user(&conn, 100).unwrap().unwrap();
    assert_eq!(user.username.as_deref(), Some("Ivanov"));
    assert!(!user.is_admin);

    // lookup is case-insensitive
    let by_name = db::get_user_by_username(&conn, "ivanov").unwrap().unwrap();
    assert_eq!(by_name.telegram_id, 100);

    db::set_user_admin(&conn, 100).unwrap();
    assert!(db::get_user(&conn, 100).unwrap().unwrap().is_admin);

    // promotion is idempotent
    db::set_user_admin(&conn, 100).unwrap();
    assert!(db::get_user(&conn, 100).unwrap().unwrap().is_admin);

    assert!(db::get_user(&conn, 999).unwrap().is_none());
    assert!(db::get_user_by_username(&conn, "nobody").unwrap().is_none());
}

#[test]
fn test_duplicate_user_is_rejected() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    db::create_user(&conn, 100, None, "Иван", false).unwrap();
    assert!(db::create_user(&conn, 100, None, "Иван", false).is_err());
}

#[test]
fn test_events_and_teams() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    let first = db::create_event(&conn, "Весенний субботник", 1).unwrap();
    let second = db::create_event(&conn, "Осенний субботник", 1).unwrap();

    // свежие первыми
    let events = db::list_events(&conn).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, second);
    assert_eq!(events[1].id, first);

    let bravo = db::create_team(&conn, "Бета", first).unwrap();
    let alpha = db::create_team(&conn, "Альфа", first).unwrap();
    db::create_team(&conn, "Гамма", second).unwrap();

    // команды субботника по алфавиту
    let teams = db::list_event_teams(&conn, first).unwrap();
    assert_eq!(teams.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), vec!["Альфа", "Бета"]);

    let all = db::list_teams_with_event(&conn).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].event_title.as_deref(), Some("Весенний субботник"));

    let team = db::get_team(&conn, alpha).unwrap().unwrap();
    assert_eq!(team.name, "Альфа");
    assert_eq!(team.event_id, first);
    assert!(db::get_team(&conn, bravo + 100).unwrap().is_none());
}

#[test]
fn test_add_points_accumulates_per_category() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    let event_id = db::create_event(&conn, "Субботник", 1).unwrap();
    let team_id = db::create_team(&conn, "Альфа", event_id).unwrap();

    db::add_points(&conn, team_id, "bag_mixed", 10).unwrap();
    db::add_points(&conn, team_id, "bag_mixed", 10).unwrap();
    db::add_points(&conn, team_id, "bulky", 20).unwrap();

    let scores = db::team_scores(&conn, team_id).unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].category, "bag_mixed");
    assert_eq!(scores[0].points, 20);
    assert_eq!(scores[1].category, "bulky");
    assert_eq!(scores[1].points, 20);
}

#[test]
fn test_subtract_points_outcomes() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    let event_id = db::create_event(&conn, "Субботник", 1).unwrap();
    let team_id = db::create_team(&conn, "Альфа", event_id).unwrap();
    db::add_points(&conn, team_id, "bag_mixed", 30).unwrap();

    assert_eq!(db::subtract_points(&conn, team_id, "bulky", 5).unwrap(), SubtractOutcome::NotFound);

    assert_eq!(db::subtract_points(&conn, team_id, "bag_mixed", 10).unwrap(), SubtractOutcome::Remaining(20));

    // вычитание больше остатка удаляет строку целиком
    assert_eq!(db::subtract_points(&conn, team_id, "bag_mixed", 25).unwrap(), SubtractOutcome::Removed);
    assert!(db::team_scores(&conn, team_id).unwrap().is_empty());

    // повторное вычитание после удаления
    assert_eq!(db::subtract_points(&conn, team_id, "bag_mixed", 1).unwrap(), SubtractOutcome::NotFound);
}

#[test]
fn test_subtract_to_exact_zero_removes_row() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    let event_id = db::create_event(&conn, "Субботник", 1).unwrap();
    let team_id = db::create_team(&conn, "Альфа", event_id).unwrap();
    db::add_points(&conn, team_id, "activity", 5).unwrap();

    assert_eq!(db::subtract_points(&conn, team_id, "activity", 5).unwrap(), SubtractOutcome::Removed);
    assert!(db::team_scores(&conn, team_id).unwrap().is_empty());
}

#[test]
fn test_event_teams_with_scores() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    let event_id = db::create_event(&conn, "Субботник", 1).unwrap();
    let other_event = db::create_event(&conn, "Другой", 1).unwrap();

    let alpha = db::create_team(&conn, "Альфа", event_id).unwrap();
    let bravo = db::create_team(&conn, "Бета", event_id).unwrap();
    let outsider = db::create_team(&conn, "Чужая", other_event).unwrap();

    db::add_points(&conn, alpha, "bag_mixed", 10).unwrap();
    db::add_points(&conn, outsider, "bag_mixed", 50).unwrap();

    let teams = db::event_teams_with_scores(&conn, event_id).unwrap();
    assert_eq!(teams.len(), 2);

    let (alpha_team, alpha_scores) = &teams[0];
    assert_eq!(alpha_team.id, alpha);
    assert_eq!(alpha_scores.len(), 1);
    assert_eq!(alpha_scores[0].points, 10);

    let (bravo_team, bravo_scores) = &teams[1];
    assert_eq!(bravo_team.id, bravo);
    assert!(bravo_scores.is_empty());
}

#[test]
fn test_deleting_team_cascades_to_scores() {
    let (_dir, pool) = test_pool();
    let conn = get_connection(&pool).unwrap();

    let event_id = db::create_event(&conn, "Субботник", 1).unwrap();
    let team_id = db::create_team(&conn, "Альфа", event_id).unwrap();
    db::add_points(&conn, team_id, "bag_mixed", 10).unwrap();

    conn.execute("DELETE FROM teams WHERE id = ?1", [team_id]).unwrap();
    assert!(db::team_scores(&conn, team_id).unwrap().is_empty());
}

#[test]
fn test_migrations_are_reentrant() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.sqlite");
    let path = db_path.to_str().unwrap();

    let pool = create_pool(path).unwrap();
    let conn = get_connection(&pool).unwrap();
    db::create_event(&conn, "Субботник", 1).unwrap();
    drop(conn);
    drop(pool);

    // a second pool over the same file must not fail on already-applied
    // migrations and must see the existing data
    let pool = create_pool(path).unwrap();
    let events = db::list_events(&get_connection(&pool).unwrap()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Субботник");
}
