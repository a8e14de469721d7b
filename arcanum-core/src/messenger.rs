//! Messaging boundary for outbound messages.
//!
//! [`Messenger`] is transport-agnostic: the streaming engine only ever sends a message (getting a
//! [`MessageHandle`] back) or edits one it sent before. Failures are classified into
//! [`MessagingError`] so callers can tell a rate limit from a rejected edit from a hard failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Chat;

/// Identifies one message sent by the bot. `message_id` is transport-specific (Telegram numeric string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub chat_id: i64,
    pub message_id: String,
}

impl MessageHandle {
    pub fn new(chat_id: i64, message_id: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id: message_id.into(),
        }
    }
}

/// Classified failure of a send or edit call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// The platform asked us to slow down; retrying after `retry_after` loses nothing.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The platform rejected this particular request (e.g. content not modified).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Anything else: network failure, chat gone, bot blocked.
    #[error("Messaging failure: {0}")]
    Fatal(String),
}

impl MessagingError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, MessagingError::RateLimited { .. })
    }
}

/// Abstraction for sending and editing messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends `text` to `chat`, optionally as a reply to `reply_to`, and returns the handle of the new message.
    async fn send(
        &self,
        chat: &Chat,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<MessageHandle, MessagingError>;

    /// Replaces the text of an already-sent message.
    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), MessagingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_handle_new() {
        let handle = MessageHandle::new(42, "7");
        assert_eq!(handle.chat_id, 42);
        assert_eq!(handle.message_id, "7");
    }

    #[test]
    fn test_is_rate_limited() {
        let limited = MessagingError::RateLimited {
            retry_after: Duration::from_secs(3),
        };
        assert!(limited.is_rate_limited());
        assert!(!MessagingError::BadRequest("not modified".to_string()).is_rate_limited());
        assert!(!MessagingError::Fatal("network".to_string()).is_rate_limited());
    }
}
