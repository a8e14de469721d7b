//! Command handlers. [`handle_message`] parses the command and routes it; plain text is ignored.

mod ask;
mod chats;
mod help;
mod start;

pub use ask::{ensure_active_chat, handle_ask};
pub use chats::{handle_chats, handle_new};
pub use help::handle_help;
pub use start::handle_start;

use arcanum_core::{ArcanumError, IncomingMessage, Result};
use storage::RepositoryError;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::commands::Command;
use crate::components::AppState;

/// Routes one incoming message. Non-command text and unknown commands are ignored.
pub async fn handle_message(
    state: &AppState,
    msg: &IncomingMessage,
    bot_username: &str,
) -> Result<()> {
    if !msg.text.starts_with('/') {
        debug!(chat_id = msg.chat.id, "Ignoring non-command text");
        return Ok(());
    }
    let command = match Command::parse(&msg.text, bot_username) {
        Ok(command) => command,
        Err(e) => {
            debug!(chat_id = msg.chat.id, error = %e, "Not a known command");
            return Ok(());
        }
    };

    info!(user_id = msg.user.id, chat_id = msg.chat.id, command = ?command, "Handling command");
    match command {
        Command::Start => handle_start(state, msg).await,
        Command::Help => handle_help(state, msg).await,
        Command::Ask(question) => handle_ask(state, msg, &question).await,
        Command::New(name) => handle_new(state, msg, &name).await,
        Command::Chats => handle_chats(state, msg).await,
    }
}

/// Sends `text` as a reply to `msg`.
pub(crate) async fn reply(state: &AppState, msg: &IncomingMessage, text: &str) -> Result<()> {
    state
        .messenger
        .send(&msg.chat, text, Some(msg.id.as_str()))
        .await?;
    Ok(())
}

pub(crate) fn db_error(e: RepositoryError) -> ArcanumError {
    ArcanumError::Database(e.to_string())
}
