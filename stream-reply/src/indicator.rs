//! "Thinking..." animation shown in the placeholder until the first fragment arrives.

use std::time::Duration;

use arcanum_core::{MessageHandle, Messenger};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How an indicator run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSummary {
    /// Frames shown after the placeholder.
    pub frames: usize,
    /// When the last edit attempt returned. `None` if no edit was attempted.
    pub last_edit: Option<Instant>,
}

/// Cycles `"{base}."`, `"{base}.."`, `"{base}..."` on one message.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    base: String,
    interval: Duration,
}

impl LoadingIndicator {
    pub fn new(base: impl Into<String>, interval: Duration) -> Self {
        Self {
            base: base.into(),
            interval,
        }
    }

    /// Text of frame `n`. Frame 0 is the placeholder itself; the k-th edit shows frame k.
    pub fn frame(&self, n: usize) -> String {
        format!("{}{}", self.base, ".".repeat(n % 3 + 1))
    }

    /// Animates `handle` until `cancel` fires.
    ///
    /// Never fails: an edit error ends the animation early.
    pub async fn run(
        &self,
        messenger: &dyn Messenger,
        handle: &MessageHandle,
        cancel: CancellationToken,
    ) -> IndicatorSummary {
        let mut frames = 0;
        let mut last_edit = None;
        loop {
            if cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }

            let result = messenger.edit(handle, &self.frame(frames + 1)).await;
            last_edit = Some(Instant::now());
            if let Err(e) = result {
                debug!(message_id = %handle.message_id, error = %e, "Loading indicator stopped");
                break;
            }
            frames += 1;
        }
        debug!(message_id = %handle.message_id, frames, "Loading indicator finished");
        IndicatorSummary { frames, last_edit }
    }
}
