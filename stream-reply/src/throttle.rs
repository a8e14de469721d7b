//! Edit pacing and rate-limit retry.

use std::time::Duration;

use arcanum_core::{Chat, MessageHandle, Messenger, MessagingError};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

/// Keeps edits at least `interval` apart and retries edits the platform rate-limited.
pub struct EditThrottler {
    interval: Duration,
    max_retries: u32,
    last_edit: Option<Instant>,
}

impl EditThrottler {
    pub fn new(interval: Duration, max_retries: u32) -> Self {
        Self {
            interval,
            max_retries,
            last_edit: None,
        }
    }

    /// Edits `handle` to `text`, waiting out the interval since the previous edit first.
    ///
    /// `RateLimited` is retried after the reported delay up to `max_retries` times, then
    /// returned. Every other error is returned as-is without retrying.
    pub async fn edit(
        &mut self,
        messenger: &dyn Messenger,
        handle: &MessageHandle,
        text: &str,
    ) -> Result<(), MessagingError> {
        if let Some(last) = self.last_edit {
            sleep_until(last + self.interval).await;
        }

        let mut retries = 0;
        loop {
            let result = messenger.edit(handle, text).await;
            self.last_edit = Some(Instant::now());
            match result {
                Ok(()) => return Ok(()),
                Err(MessagingError::RateLimited { retry_after }) if retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        message_id = %handle.message_id,
                        retry_after_ms = retry_after.as_millis() as u64,
                        attempt = retries,
                        "Edit rate limited, retrying"
                    );
                    sleep(retry_after).await;
                }
                Err(e) => {
                    debug!(message_id = %handle.message_id, error = %e, "Edit failed");
                    return Err(e);
                }
            }
        }
    }

    /// Records an edit of the same message made outside the throttler, so the next
    /// [`Self::edit`] still waits the full interval after it.
    pub fn mark_edited(&mut self, at: Instant) {
        self.last_edit = Some(self.last_edit.map_or(at, |last| last.max(at)));
    }

    pub fn last_edit(&self) -> Option<Instant> {
        self.last_edit
    }
}

/// Sends a new message, retrying `RateLimited` like [`EditThrottler::edit`] does.
pub async fn send_with_retry(
    messenger: &dyn Messenger,
    chat: &Chat,
    text: &str,
    reply_to: Option<&str>,
    max_retries: u32,
) -> Result<MessageHandle, MessagingError> {
    let mut retries = 0;
    loop {
        match messenger.send(chat, text, reply_to).await {
            Ok(handle) => return Ok(handle),
            Err(MessagingError::RateLimited { retry_after }) if retries < max_retries => {
                retries += 1;
                warn!(
                    chat_id = chat.id,
                    retry_after_ms = retry_after.as_millis() as u64,
                    attempt = retries,
                    "Send rate limited, retrying"
                );
                sleep(retry_after).await;
            }
            Err(e) => return Err(e),
        }
    }
}
