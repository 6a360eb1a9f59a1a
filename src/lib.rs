//! Subbotnik bot - Telegram bot for running clean-up day competitions
//!
//! The bot lets administrators create clean-up events, register teams,
//! award points by category through an inline wizard, correct awarded
//! points, and export per-event results.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, the category table
//! - `storage`: SQLite database access and migrations
//! - `telegram`: bot integration, dialogue states, and handlers

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, init_logger, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, State};
