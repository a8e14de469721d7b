//! Message repository: append-only chat history.
//!
//! Rows are never updated; ordering is by creation time, then insertion order.

use tracing::{debug, info};

use crate::error::{db_error, RepositoryError};
use crate::models::{MessageRecord, Role};
use crate::session::DbSession;

pub struct MessageRepository<'a> {
    session: &'a mut DbSession,
}

impl<'a> MessageRepository<'a> {
    pub(crate) fn new(session: &'a mut DbSession) -> Self {
        Self { session }
    }

    /// Appends one message to the chat history and returns the stored record.
    pub async fn append(
        &mut self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<MessageRecord, RepositoryError> {
        let record = MessageRecord::new(chat_id, role, content);
        let conn = self.session.conn().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, chat_id, role, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.chat_id)
        .bind(record.role)
        .bind(&record.content)
        .bind(record.created_at)
        .execute(conn)
        .await
        .map_err(db_error("MessageRepository::append"))?;

        info!(
            chat_id,
            role = %role,
            message_id = %record.id,
            content_len = record.content.len(),
            "Saved message"
        );
        Ok(record)
    }

    /// Full history of a chat, oldest first.
    pub async fn list_for_chat(&mut self, chat_id: i64) -> Result<Vec<MessageRecord>, RepositoryError> {
        let conn = self.session.conn().await?;
        let messages = sqlx::query_as::<_, MessageRecord>(
            "SELECT id, chat_id, role, content, created_at FROM messages \
             WHERE chat_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(chat_id)
        .fetch_all(conn)
        .await
        .map_err(db_error("MessageRepository::list_for_chat"))?;

        debug!(chat_id, count = messages.len(), "Retrieved chat history");
        Ok(messages)
    }

    pub async fn count_for_chat(&mut self, chat_id: i64) -> Result<i64, RepositoryError> {
        let conn = self.session.conn().await?;
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(conn)
            .await
            .map_err(db_error("MessageRepository::count_for_chat"))?;
        Ok(count.0)
    }
}
