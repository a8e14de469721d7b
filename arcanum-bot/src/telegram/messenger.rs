//! Wraps teloxide::Bot and implements [`Messenger`]. Production code sends messages via Telegram;
//! tests substitute another Messenger impl.

use arcanum_core::{Chat, MessageHandle, Messenger, MessagingError};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters};
use teloxide::{ApiError, RequestError};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements core's Messenger trait.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Parses a message id produced by [`TelegramMessenger::send`].
pub fn parse_message_id(raw: &str) -> Result<MessageId, MessagingError> {
    raw.parse::<i32>()
        .map(MessageId)
        .map_err(|_| MessagingError::Fatal(format!("Invalid Telegram message id: {raw}")))
}

/// Maps a teloxide error onto the messaging error classes.
///
/// Flood control becomes `RateLimited`; edits Telegram refuses for their content (not
/// modified, empty, unparsable, other 400s) become `BadRequest`; the rest is `Fatal`.
pub fn classify_request_error(error: &RequestError) -> MessagingError {
    match error {
        RequestError::RetryAfter(seconds) => MessagingError::RateLimited {
            retry_after: seconds.duration(),
        },
        RequestError::Api(
            api @ (ApiError::MessageNotModified
            | ApiError::MessageTextIsEmpty
            | ApiError::CantParseEntities(_)
            | ApiError::Unknown(_)),
        ) => MessagingError::BadRequest(api.to_string()),
        other => MessagingError::Fatal(other.to_string()),
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(
        &self,
        chat: &Chat,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<MessageHandle, MessagingError> {
        let mut request = self.bot.send_message(ChatId(chat.id), text.to_string());
        if let Some(id) = reply_to.and_then(|raw| raw.parse::<i32>().ok()) {
            request = request
                .reply_parameters(ReplyParameters::new(MessageId(id)).allow_sending_without_reply());
        }
        let sent = request.await.map_err(|e| classify_request_error(&e))?;
        debug!(chat_id = chat.id, message_id = %sent.id, "Message sent");
        Ok(MessageHandle::new(chat.id, sent.id.to_string()))
    }

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), MessagingError> {
        let id = parse_message_id(&handle.message_id)?;
        self.bot
            .edit_message_text(ChatId(handle.chat_id), id, text.to_string())
            .await
            .map_err(|e| classify_request_error(&e))?;
        Ok(())
    }
}
