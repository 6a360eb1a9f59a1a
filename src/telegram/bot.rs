//! Bot instance creation and command registration

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Команды бота:")]
pub enum Command {
    #[command(description = "главное меню")]
    Start,
    #[command(description = "создать субботник")]
    CreateEvent,
    #[command(description = "добавить команду к субботнику")]
    AddTeam,
    #[command(description = "проставить баллы")]
    Score,
    #[command(description = "управление баллами")]
    AdjustScore,
}

/// Creates a Bot instance from the configured token
///
/// # Errors
/// Returns an error when neither BOT_TOKEN nor TELOXIDE_TOKEN is set.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }
    Ok(Bot::new(token))
}

/// Sets up bot commands in the Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "главное меню"),
        BotCommand::new("create_event", "создать субботник"),
        BotCommand::new("add_team", "добавить команду к субботнику"),
        BotCommand::new("score", "проставить баллы"),
        BotCommand::new("adjust_score", "управление баллами"),
    ])
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let commands = format!("{}", Command::descriptions());

        assert!(commands.contains("Команды бота"));
        assert!(commands.contains("/start"));
        assert!(commands.contains("/create_event"));
        assert!(commands.contains("/adjust_score"));
    }
}
