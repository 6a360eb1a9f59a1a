use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "subbotnik-bot")]
#[command(author, version, about = "Telegram bot for running clean-up day competitions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Apply pending database migrations and exit
    Migrate,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
