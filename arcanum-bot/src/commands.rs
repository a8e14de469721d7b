//! Bot commands shown in the Telegram menu and parsed from incoming text.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "start the bot and get a welcome message.")]
    Start,
    #[command(description = "show this help message.")]
    Help,
    #[command(description = "ask the AI anything, e.g. /ask What day is it today?")]
    Ask(String),
    #[command(description = "start a new chat, optionally named: /new [name].")]
    New(String),
    #[command(description = "list your chats.")]
    Chats,
}
