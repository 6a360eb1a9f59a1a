use once_cell::sync::Lazy;
use std::env;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: database.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "database.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: logs/bot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bot.log".to_string()));

/// Temporary files directory for export documents
/// Read from TEMP_FILES_DIR environment variable
/// Default: /tmp
pub static TEMP_FILES_DIR: Lazy<String> =
    Lazy::new(|| env::var("TEMP_FILES_DIR").unwrap_or_else(|_| "/tmp".to_string()));

/// Telegram ids that become administrators on first contact.
/// Read from ADMIN_IDS environment variable as a comma-separated list;
/// malformed entries are skipped.
pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
    env::var("ADMIN_IDS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
});

/// Page sizes for the two paginated team lists
pub mod pages {
    /// Team browser in the database view ("Все команды")
    pub const TEAM_BROWSER: usize = 20;

    /// Team selection step of the scoring wizard
    pub const WIZARD_TEAMS: usize = 10;
}

/// Checks whether a Telegram id is in the bootstrap admin list
pub fn is_bootstrap_admin(telegram_id: i64) -> bool {
    ADMIN_IDS.contains(&telegram_id)
}
