use arcanum_core::{IncomingMessage, Result};
use teloxide::utils::command::BotCommands;

use super::reply;
use crate::commands::Command;
use crate::components::AppState;

pub async fn handle_help(state: &AppState, msg: &IncomingMessage) -> Result<()> {
    let text = format!(
        "{}\n\nExample: /ask What day is it today?",
        Command::descriptions()
    );
    reply(state, msg, &text).await
}
