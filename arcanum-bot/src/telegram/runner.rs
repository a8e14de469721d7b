//! REPL runner: converts teloxide messages to core messages and dispatches them to the command
//! handlers, one spawned task per message.

use std::sync::Arc;

use anyhow::Result;
use arcanum_core::ToCoreMessage;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use super::adapters::TelegramMessageWrapper;
use crate::components::AppState;
use crate::handlers;

/// Starts the REPL. Calls get_me() first so addressed commands (`/ask@bot`) parse.
#[instrument(skip(bot, state))]
pub async fn run_repl(bot: Bot, state: AppState) -> Result<()> {
    let me = bot.get_me().await?;
    let bot_username = Arc::new(me.user.username.clone().unwrap_or_default());
    info!(username = %bot_username, "Bot username resolved");

    teloxide::repl(bot, move |_bot: Bot, msg: Message| {
        let state = state.clone();
        let bot_username = bot_username.clone();

        async move {
            let Some(core_msg) = TelegramMessageWrapper(&msg).to_core() else {
                info!(chat_id = msg.chat.id.0, "Ignoring non-text message");
                return Ok(());
            };

            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                message_id = %core_msg.id,
                "Received message"
            );

            // Handle in a spawned task so the REPL keeps receiving while a reply streams.
            tokio::spawn(async move {
                if let Err(e) = handlers::handle_message(&state, &core_msg, &bot_username).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
