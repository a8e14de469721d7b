//! /new and /chats: chat session management.

use arcanum_core::{IncomingMessage, Result};
use tracing::info;

use super::{db_error, reply};
use crate::components::AppState;

/// Deactivates the current chat and opens a new active one. A blank name becomes "Chat N".
pub async fn handle_new(state: &AppState, msg: &IncomingMessage, name: &str) -> Result<()> {
    let mut session = state.db.session();
    let (user, _) = session
        .users()
        .get_or_create(msg.user.id)
        .await
        .map_err(db_error)?;

    let deactivated = session
        .chats()
        .deactivate_all(user.id)
        .await
        .map_err(db_error)?;

    let name = match name.trim() {
        "" => {
            let existing = session
                .chats()
                .list_for_user(user.id)
                .await
                .map_err(db_error)?
                .len();
            format!("Chat {}", existing + 1)
        }
        given => given.to_string(),
    };
    let chat = session
        .chats()
        .create(user.id, &name, true)
        .await
        .map_err(db_error)?;
    session.commit().await.map_err(db_error)?;

    info!(user_id = user.id, chat_id = chat.id, deactivated, "Started new chat");
    reply(state, msg, &format!("Started a new chat: {}", chat.chat_name)).await
}

pub async fn handle_chats(state: &AppState, msg: &IncomingMessage) -> Result<()> {
    let mut session = state.db.session();
    let (user, _) = session
        .users()
        .get_or_create(msg.user.id)
        .await
        .map_err(db_error)?;
    let chats = session
        .chats()
        .list_for_user(user.id)
        .await
        .map_err(db_error)?;
    session.commit().await.map_err(db_error)?;

    if chats.is_empty() {
        return reply(state, msg, "You have no chats yet. Ask something with /ask or start one with /new.").await;
    }

    let mut text = String::from("Your chats:");
    for (i, chat) in chats.iter().enumerate() {
        text.push_str(&format!("\n{}. {}", i + 1, chat.chat_name));
        if chat.is_active {
            text.push_str(" (active)");
        }
    }
    reply(state, msg, &text).await
}
