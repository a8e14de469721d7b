//! Shared fixtures for stream-reply integration tests.

#![allow(dead_code)]

pub mod mock_messenger;

use std::sync::Mutex;
use std::time::Duration;

use arcanum_core::Chat;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use llm_client::{Fragment, FragmentSource, FragmentStream};
use storage::{MessageSink, RepositoryError, Role};

/// Fragment source replaying a fixed script. Each fragment is delivered after its delay.
pub struct ScriptedSource {
    script: Vec<(Duration, Fragment)>,
}

impl ScriptedSource {
    /// Every fragment immediately.
    pub fn immediate(fragments: Vec<Fragment>) -> Self {
        Self {
            script: fragments.into_iter().map(|f| (Duration::ZERO, f)).collect(),
        }
    }

    pub fn delayed(script: Vec<(Duration, Fragment)>) -> Self {
        Self { script }
    }
}

impl FragmentSource for ScriptedSource {
    fn open(&self, _prompt: &str, _model: &str) -> FragmentStream {
        stream::iter(self.script.clone())
            .then(|(delay, fragment)| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                fragment
            })
            .boxed()
    }
}

/// Sink that keeps appended messages in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<(i64, Role, String)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(i64, Role, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn append_message(
        &mut self,
        chat_id: i64,
        role: Role,
        content: &str,
    ) -> Result<(), RepositoryError> {
        self.messages
            .lock()
            .unwrap()
            .push((chat_id, role, content.to_string()));
        Ok(())
    }
}

pub fn chat() -> Chat {
    Chat {
        id: 42,
        chat_type: "private".to_string(),
    }
}

pub fn text(s: &str) -> Fragment {
    Fragment::text(s)
}
