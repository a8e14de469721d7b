//! /ask: streams the model's answer into the chat and records both sides in the active chat.

use arcanum_core::{IncomingMessage, Result};
use storage::{Database, RepositoryError};
use stream_reply::{ReconcileError, StreamReconciler, StreamRequest};
use tracing::{error, info, warn};

use super::{db_error, reply};
use crate::components::AppState;

const USAGE: &str = "Please add a question after the command, e.g. /ask What day is it today?";

pub async fn handle_ask(state: &AppState, msg: &IncomingMessage, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        return reply(state, msg, USAGE).await;
    }

    let chat_id = ensure_active_chat(&state.db, msg.user.id)
        .await
        .map_err(db_error)?;

    let request = StreamRequest {
        chat: msg.chat.clone(),
        reply_to: Some(msg.id.clone()),
        session_id: chat_id,
        prompt: question.to_string(),
        model: state.model.clone(),
    };

    let reconciler = StreamReconciler::new(
        state.messenger.as_ref(),
        state.llm.as_ref(),
        state.stream.as_ref(),
    );
    let mut session = state.db.session();
    match reconciler.run(&request, &mut session).await {
        Ok(outcome) => {
            session.commit().await.map_err(db_error)?;
            info!(
                chat_id,
                state = ?outcome.state,
                units = outcome.units.len(),
                persisted = outcome.persisted,
                "Ask finished"
            );
            Ok(())
        }
        Err(ReconcileError::Setup(e)) => {
            warn!(chat_id, error = %e, "Could not start the reply");
            Ok(())
        }
        Err(ReconcileError::Persistence(e)) => {
            error!(chat_id, error = %e, "Reply shown but not saved");
            Err(db_error(e))
        }
    }
}

/// Returns the id of the user's active chat, registering the user and creating "Chat N" when
/// needed. Runs in its own committed session.
pub async fn ensure_active_chat(
    db: &Database,
    telegram_id: i64,
) -> std::result::Result<i64, RepositoryError> {
    let mut session = db.session();
    let (user, _) = session.users().get_or_create(telegram_id).await?;

    let chat_id = match session.chats().get_active(user.id).await? {
        Some(chat) => chat.id,
        None => {
            let existing = session.chats().list_for_user(user.id).await?.len();
            let name = format!("Chat {}", existing + 1);
            match session.chats().create(user.id, &name, true).await {
                Ok(chat) => chat.id,
                Err(RepositoryError::ActiveChatExists { chat_id, .. }) => chat_id,
                Err(e) => return Err(e),
            }
        }
    };

    session.commit().await?;
    Ok(chat_id)
}
