//! Chat repository: per-user chat sessions with the "at most one active chat" rule.
//!
//! The rule is enforced twice: `create` refuses to add an active chat while one exists, and the
//! partial unique index `idx_chats_one_active` catches concurrent writers.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{db_error, RepositoryError};
use crate::models::ChatRecord;
use crate::session::DbSession;

const CHAT_COLUMNS: &str = "id, user_id, chat_name, is_active, created_at";

pub struct ChatRepository<'a> {
    session: &'a mut DbSession,
}

impl<'a> ChatRepository<'a> {
    pub(crate) fn new(session: &'a mut DbSession) -> Self {
        Self { session }
    }

    /// Creates a chat for `user_id`.
    ///
    /// Creating an active chat while the user already has one returns
    /// [`RepositoryError::ActiveChatExists`]; call [`Self::deactivate_all`] first.
    pub async fn create(
        &mut self,
        user_id: i64,
        chat_name: &str,
        is_active: bool,
    ) -> Result<ChatRecord, RepositoryError> {
        info!(user_id, chat_name, is_active, "Creating chat");
        if is_active {
            if let Some(active) = self.get_active(user_id).await? {
                warn!(user_id, chat_id = active.id, "Rejecting second active chat");
                return Err(RepositoryError::ActiveChatExists {
                    user_id,
                    chat_id: active.id,
                });
            }
        }

        let conn = self.session.conn().await?;
        let sql = format!(
            "INSERT INTO chats (user_id, chat_name, is_active, created_at) VALUES (?, ?, ?, ?) \
             RETURNING {CHAT_COLUMNS}"
        );
        let result = sqlx::query_as::<_, ChatRecord>(&sql)
            .bind(user_id)
            .bind(chat_name)
            .bind(is_active)
            .bind(Utc::now())
            .fetch_one(conn)
            .await
            .map_err(db_error("ChatRepository::create"));

        match result {
            Ok(chat) => {
                debug!(user_id, chat_id = chat.id, "Chat created");
                Ok(chat)
            }
            Err(e) if is_active && e.is_unique_violation() => {
                let chat_id = self.get_active(user_id).await?.map(|c| c.id).unwrap_or_default();
                Err(RepositoryError::ActiveChatExists { user_id, chat_id })
            }
            Err(e) => Err(e),
        }
    }

    /// Gets a chat by its database id.
    pub async fn get_by_id(&mut self, chat_id: i64) -> Result<ChatRecord, RepositoryError> {
        debug!(chat_id, "Getting chat");
        let conn = self.session.conn().await?;
        let sql = format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = ?");
        sqlx::query_as::<_, ChatRecord>(&sql)
            .bind(chat_id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("ChatRepository::get_by_id"))?
            .ok_or_else(|| RepositoryError::NotFound(format!("chat {}", chat_id)))
    }

    /// All chats of a user, oldest first. Empty when the user has none.
    pub async fn list_for_user(&mut self, user_id: i64) -> Result<Vec<ChatRecord>, RepositoryError> {
        debug!(user_id, "Listing chats");
        let conn = self.session.conn().await?;
        let sql = format!("SELECT {CHAT_COLUMNS} FROM chats WHERE user_id = ? ORDER BY id ASC");
        sqlx::query_as::<_, ChatRecord>(&sql)
            .bind(user_id)
            .fetch_all(conn)
            .await
            .map_err(db_error("ChatRepository::list_for_user"))
    }

    /// The user's active chat, if any.
    pub async fn get_active(&mut self, user_id: i64) -> Result<Option<ChatRecord>, RepositoryError> {
        debug!(user_id, "Getting active chat");
        let conn = self.session.conn().await?;
        let sql = format!("SELECT {CHAT_COLUMNS} FROM chats WHERE user_id = ? AND is_active = 1");
        sqlx::query_as::<_, ChatRecord>(&sql)
            .bind(user_id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("ChatRepository::get_active"))
    }

    /// Deactivates every active chat of the user. Returns the number of chats changed.
    pub async fn deactivate_all(&mut self, user_id: i64) -> Result<u64, RepositoryError> {
        debug!(user_id, "Deactivating chats");
        let conn = self.session.conn().await?;
        let result = sqlx::query("UPDATE chats SET is_active = 0 WHERE user_id = ? AND is_active = 1")
            .bind(user_id)
            .execute(conn)
            .await
            .map_err(db_error("ChatRepository::deactivate_all"))?;
        Ok(result.rows_affected())
    }
}
