use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Result};

use super::migrations;

/// Структура, представляющая пользователя (админа или обычного) в базе данных.
#[derive(Debug, Clone)]
pub struct User {
    /// Telegram ID пользователя
    pub telegram_id: i64,
    /// Имя пользователя (username) в Telegram, если доступно
    pub username: Option<String>,
    /// Отображаемое имя
    pub first_name: String,
    /// Флаг администратора
    pub is_admin: bool,
}

/// Субботник — именованное мероприятие, к которому привязаны команды.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub title: String,
    /// Telegram ID админа, который создал субботник
    pub created_by: i64,
    pub created_at: String,
}

/// Команда участников; принадлежит ровно одному субботнику.
#[derive(Debug, Clone)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub event_id: i64,
}

/// Команда вместе с названием своего субботника (для списка команд).
#[derive(Debug, Clone)]
pub struct TeamWithEvent {
    pub id: i64,
    pub name: String,
    /// None, если строка субботника исчезла (отображается заглушкой)
    pub event_title: Option<String>,
}

/// Начисленные баллы команды по одной категории.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub team_id: i64,
    /// Ключ категории из статической таблицы категорий
    pub category: String,
    pub points: i64,
}

/// Result of subtracting points from a score row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtractOutcome {
    /// No score row exists for this team/category
    NotFound,
    /// The row dropped to zero or below and was deleted
    Removed,
    /// Points remaining after the subtraction
    Remaining(i64),
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections, enables foreign
/// keys on every connection and runs schema migrations.
pub fn create_pool(database_path: &str) -> anyhow::Result<DbPool> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let mut conn = pool.get()?;
    migrations::run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

// ─── Users ───────────────────────────────────────────────────────────

/// Создает нового пользователя в базе данных.
///
/// # Errors
///
/// Возвращает ошибку если пользователь с таким Telegram ID уже существует
/// или произошла ошибка БД.
pub fn create_user(
    conn: &DbConnection,
    telegram_id: i64,
    username: Option<&str>,
    first_name: &str,
    is_admin: bool,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (telegram_id, username, first_name, is_admin) VALUES (?1, ?2, ?3, ?4)",
        &[
            &telegram_id as &dyn rusqlite::ToSql,
            &username as &dyn rusqlite::ToSql,
            &first_name as &dyn rusqlite::ToSql,
            &is_admin as &dyn rusqlite::ToSql,
        ],
    )?;
    Ok(())
}

/// Получает пользователя из базы данных по Telegram ID.
pub fn get_user(conn: &DbConnection, telegram_id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT telegram_id, username, first_name, is_admin FROM users WHERE telegram_id = ?1",
        &[&telegram_id as &dyn rusqlite::ToSql],
        |row| {
            Ok(User {
                telegram_id: row.get(0)?,
                username: row.get(1)?,
                first_name: row.get(2)?,
                is_admin: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Ищет пользователя по username без учета регистра.
pub fn get_user_by_username(conn: &DbConnection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT telegram_id, username, first_name, is_admin FROM users
         WHERE username = ?1 COLLATE NOCASE",
        &[&username as &dyn rusqlite::ToSql],
        |row| {
            Ok(User {
                telegram_id: row.get(0)?,
                username: row.get(1)?,
                first_name: row.get(2)?,
                is_admin: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Назначает пользователя администратором.
pub fn set_user_admin(conn: &DbConnection, telegram_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET is_admin = 1 WHERE telegram_id = ?1",
        &[&telegram_id as &dyn rusqlite::ToSql],
    )?;
    Ok(())
}

// ─── Events ──────────────────────────────────────────────────────────

/// Создает субботник и возвращает его id.
pub fn create_event(conn: &DbConnection, title: &str, created_by: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (title, created_by) VALUES (?1, ?2)",
        &[&title as &dyn rusqlite::ToSql, &created_by as &dyn rusqlite::ToSql],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Список всех субботников, свежие первыми.
pub fn list_events(conn: &DbConnection) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, created_by, created_at FROM events
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Event {
            id: row.get(0)?,
            title: row.get(1)?,
            created_by: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Получает субботник по id.
pub fn get_event(conn: &DbConnection, event_id: i64) -> Result<Option<Event>> {
    conn.query_row(
        "SELECT id, title, created_by, created_at FROM events WHERE id = ?1",
        &[&event_id as &dyn rusqlite::ToSql],
        |row| {
            Ok(Event {
                id: row.get(0)?,
                title: row.get(1)?,
                created_by: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
    .optional()
}

// ─── Teams ───────────────────────────────────────────────────────────

/// Добавляет команду к субботнику и возвращает её id.
pub fn create_team(conn: &DbConnection, name: &str, event_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO teams (name, event_id) VALUES (?1, ?2)",
        &[&name as &dyn rusqlite::ToSql, &event_id as &dyn rusqlite::ToSql],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Команды одного субботника, по алфавиту.
pub fn list_event_teams(conn: &DbConnection, event_id: i64) -> Result<Vec<Team>> {
    let mut stmt =
        conn.prepare("SELECT id, name, event_id FROM teams WHERE event_id = ?1 ORDER BY name, id")?;
    let rows = stmt.query_map(&[&event_id as &dyn rusqlite::ToSql], |row| {
        Ok(Team {
            id: row.get(0)?,
            name: row.get(1)?,
            event_id: row.get(2)?,
        })
    })?;
    rows.collect()
}

/// Все команды с названиями своих субботников (для постраничного списка).
pub fn list_teams_with_event(conn: &DbConnection) -> Result<Vec<TeamWithEvent>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, e.title FROM teams t
         LEFT JOIN events e ON e.id = t.event_id
         ORDER BY t.event_id, t.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(TeamWithEvent {
            id: row.get(0)?,
            name: row.get(1)?,
            event_title: row.get(2)?,
        })
    })?;
    rows.collect()
}

/// Получает команду по id.
pub fn get_team(conn: &DbConnection, team_id: i64) -> Result<Option<Team>> {
    conn.query_row(
        "SELECT id, name, event_id FROM teams WHERE id = ?1",
        &[&team_id as &dyn rusqlite::ToSql],
        |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                event_id: row.get(2)?,
            })
        },
    )
    .optional()
}

// ─── Scores ──────────────────────────────────────────────────────────

/// Начисляет баллы команде по категории.
///
/// Баллы накапливаются: повторное начисление по той же категории
/// прибавляется к существующей строке (upsert по UNIQUE(team_id, category)).
pub fn add_points(conn: &DbConnection, team_id: i64, category: &str, points: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO scores (team_id, category, points) VALUES (?1, ?2, ?3)
         ON CONFLICT(team_id, category) DO UPDATE SET points = points + excluded.points",
        &[
            &team_id as &dyn rusqlite::ToSql,
            &category as &dyn rusqlite::ToSql,
            &points as &dyn rusqlite::ToSql,
        ],
    )?;
    Ok(())
}

/// Текущие баллы команды по всем категориям, в порядке начисления.
pub fn team_scores(conn: &DbConnection, team_id: i64) -> Result<Vec<Score>> {
    let mut stmt = conn
        .prepare("SELECT team_id, category, points FROM scores WHERE team_id = ?1 ORDER BY id")?;
    let rows = stmt.query_map(&[&team_id as &dyn rusqlite::ToSql], |row| {
        Ok(Score {
            team_id: row.get(0)?,
            category: row.get(1)?,
            points: row.get(2)?,
        })
    })?;
    rows.collect()
}

/// Вычитает баллы из категории команды.
///
/// Строка удаляется целиком, как только значение опускается до нуля
/// или ниже.
pub fn subtract_points(
    conn: &DbConnection,
    team_id: i64,
    category: &str,
    amount: i64,
) -> Result<SubtractOutcome> {
    let current: Option<i64> = conn
        .query_row(
            "SELECT points FROM scores WHERE team_id = ?1 AND category = ?2",
            &[&team_id as &dyn rusqlite::ToSql, &category as &dyn rusqlite::ToSql],
            |row| row.get(0),
        )
        .optional()?;

    let Some(current) = current else {
        return Ok(SubtractOutcome::NotFound);
    };

    let remaining = current - amount;
    if remaining <= 0 {
        conn.execute(
            "DELETE FROM scores WHERE team_id = ?1 AND category = ?2",
            &[&team_id as &dyn rusqlite::ToSql, &category as &dyn rusqlite::ToSql],
        )?;
        Ok(SubtractOutcome::Removed)
    } else {
        conn.execute(
            "UPDATE scores SET points = ?1 WHERE team_id = ?2 AND category = ?3",
            &[
                &remaining as &dyn rusqlite::ToSql,
                &team_id as &dyn rusqlite::ToSql,
                &category as &dyn rusqlite::ToSql,
            ],
        )?;
        Ok(SubtractOutcome::Remaining(remaining))
    }
}

/// Команды субботника вместе с их баллами (для отчёта и экспорта).
pub fn event_teams_with_scores(
    conn: &DbConnection,
    event_id: i64,
) -> Result<Vec<(Team, Vec<Score>)>> {
    let teams = list_event_teams(conn, event_id)?;
    let mut result = Vec::with_capacity(teams.len());
    for team in teams {
        let scores = team_scores(conn, team.id)?;
        result.push((team, scores));
    }
    Ok(result)
}
