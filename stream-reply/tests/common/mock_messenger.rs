//! Recording mock of [`arcanum_core::Messenger`] for reconciler tests.
//!
//! Records every send and edit attempt. Message ids are handed out from 100 upwards.
//! Failures are scripted per text (edits) or per send index so tests stay independent of the
//! exact number of indicator frames.

use std::collections::HashMap;
use std::sync::Mutex;

use arcanum_core::{Chat, MessageHandle, Messenger, MessagingError};
use async_trait::async_trait;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send {
        message_id: String,
        text: String,
        reply_to: Option<String>,
    },
    Edit {
        message_id: String,
        text: String,
        ok: bool,
    },
}

#[derive(Default)]
pub struct MockMessenger {
    calls: Mutex<Vec<Call>>,
    edit_times: Mutex<Vec<(String, Instant)>>,
    sends: Mutex<usize>,
    edit_failures: Mutex<HashMap<String, Vec<MessagingError>>>,
    send_failures: Mutex<HashMap<usize, MessagingError>>,
}

#[allow(dead_code)]
impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next edit attempts with exactly `text` fail with `errors`, in order.
    pub fn fail_edit(&self, text: &str, errors: Vec<MessagingError>) {
        self.edit_failures
            .lock()
            .unwrap()
            .insert(text.to_string(), errors);
    }

    /// The send with 0-based index `index` fails with `error`.
    pub fn fail_send(&self, index: usize, error: MessagingError) {
        self.send_failures.lock().unwrap().insert(index, error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<(String, String, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send {
                    message_id,
                    text,
                    reply_to,
                } => Some((message_id, text, reply_to)),
                _ => None,
            })
            .collect()
    }

    /// Texts of successful edits, in order.
    pub fn edited_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Edit { text, ok: true, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Every edit attempt with the time it was made.
    pub fn edit_times(&self) -> Vec<(String, Instant)> {
        self.edit_times.lock().unwrap().clone()
    }

    pub fn edit_attempts_with(&self, text: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Edit { text: t, .. } if t == text))
            .count()
    }

    /// What each sent message shows now, in send order.
    pub fn displayed(&self) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut texts: HashMap<String, String> = HashMap::new();
        for call in self.calls() {
            match call {
                Call::Send {
                    message_id, text, ..
                } => {
                    order.push(message_id.clone());
                    texts.insert(message_id, text);
                }
                Call::Edit {
                    message_id,
                    text,
                    ok: true,
                } => {
                    texts.insert(message_id, text);
                }
                Call::Edit { .. } => {}
            }
        }
        order
            .into_iter()
            .map(|id| texts.remove(&id).unwrap_or_default())
            .collect()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send(
        &self,
        chat: &Chat,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<MessageHandle, MessagingError> {
        let index = {
            let mut sends = self.sends.lock().unwrap();
            let index = *sends;
            *sends += 1;
            index
        };
        if let Some(error) = self.send_failures.lock().unwrap().remove(&index) {
            return Err(error);
        }
        let message_id = (100 + index).to_string();
        self.calls.lock().unwrap().push(Call::Send {
            message_id: message_id.clone(),
            text: text.to_string(),
            reply_to: reply_to.map(str::to_string),
        });
        Ok(MessageHandle::new(chat.id, message_id))
    }

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), MessagingError> {
        let failure = {
            let mut failures = self.edit_failures.lock().unwrap();
            match failures.get_mut(text) {
                Some(errors) if !errors.is_empty() => Some(errors.remove(0)),
                _ => None,
            }
        };
        self.edit_times
            .lock()
            .unwrap()
            .push((text.to_string(), Instant::now()));
        self.calls.lock().unwrap().push(Call::Edit {
            message_id: handle.message_id.clone(),
            text: text.to_string(),
            ok: failure.is_none(),
        });
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
