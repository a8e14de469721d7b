//! /start: registers the user and greets them.

use arcanum_core::{IncomingMessage, Result};
use tracing::info;

use super::{db_error, reply};
use crate::components::AppState;

pub async fn handle_start(state: &AppState, msg: &IncomingMessage) -> Result<()> {
    let mut session = state.db.session();
    let (user, created) = session
        .users()
        .get_or_create(msg.user.id)
        .await
        .map_err(db_error)?;
    session.commit().await.map_err(db_error)?;

    let name = msg.user.display_name();
    let text = if created {
        info!(user_id = user.id, telegram_id = user.telegram_id, "Registered new user");
        format!("Hello, {name}! I'm Arcanum, an AI assistant.\nSend /help to see what I can do.")
    } else {
        format!("Welcome back, {name}! How can I help?")
    };
    reply(state, msg, &text).await
}
