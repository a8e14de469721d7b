//! Append-only persistence contract used by the streaming engine.

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::Role;
use crate::session::DbSession;

/// Receives finished messages of one interaction. Implementations only append; commit and
/// rollback belong to whoever owns the sink.
#[async_trait]
pub trait MessageSink: Send {
    async fn append_message(
        &mut self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
impl MessageSink for DbSession {
    async fn append_message(
        &mut self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<(), RepositoryError> {
        self.messages().append(chat_id, role, content).await?;
        Ok(())
    }
}
