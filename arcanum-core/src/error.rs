//! Error types for the bot core.
//!
//! [`ArcanumError`] is the top-level error returned by command handlers.

use thiserror::Error;

use crate::messenger::MessagingError;

/// Top-level error for the bot: a failed database call or a failed message send.
#[derive(Error, Debug)]
pub enum ArcanumError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),
}

/// Result type for handler operations; uses [`ArcanumError`].
pub type Result<T> = std::result::Result<T, ArcanumError>;
