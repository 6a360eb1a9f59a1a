use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;

use subbotnik_bot::cli::{Cli, Commands};
use subbotnik_bot::core::{config, init_logger};
use subbotnik_bot::storage::{create_pool, migrations};
use subbotnik_bot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, State};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Migrate) => run_migrations(),
        Some(Commands::Run) | None => run_bot().await,
    }
}

/// Apply pending migrations without starting the bot
fn run_migrations() -> Result<()> {
    let mut conn = rusqlite::Connection::open(config::DATABASE_PATH.as_str())?;
    migrations::run_migrations(&mut conn)?;
    log::info!("Migrations applied, database is up to date");
    Ok(())
}

/// Run the Telegram bot in long polling mode
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");

    let bot = create_bot()?;
    let bot_info = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    setup_bot_commands(&bot).await?;

    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );

    if config::ADMIN_IDS.is_empty() {
        log::warn!("ADMIN_IDS is not set: nobody can become the first admin");
    }

    let deps = HandlerDeps::new(Arc::clone(&db_pool));

    log::info!("📡 Ready to receive updates!");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<State>::new(), deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
