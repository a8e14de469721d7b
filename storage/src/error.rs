//! Storage error types.
//!
//! Every repository call translates `sqlx::Error` into [`RepositoryError::Database`], so callers
//! react to one error kind instead of the driver's taxonomy.

use thiserror::Error;
use tracing::error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User {user_id} already has an active chat ({chat_id}); deactivate it first")]
    ActiveChatExists { user_id: i64, chat_id: i64 },
}

impl RepositoryError {
    /// True when the underlying driver error is a UNIQUE constraint violation.
    pub(crate) fn is_unique_violation(&self) -> bool {
        match self {
            RepositoryError::Database {
                source: sqlx::Error::Database(db),
                ..
            } => db.is_unique_violation(),
            _ => false,
        }
    }
}

/// Returns a mapper that logs a driver error once and wraps it as [`RepositoryError::Database`].
///
/// Usage: `.await.map_err(db_error("ChatRepository::create"))?`
pub(crate) fn db_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |source| {
        error!(operation, error = %source, "Database error");
        RepositoryError::Database { operation, source }
    }
}
