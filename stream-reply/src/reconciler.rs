//! Stream reconciler: grows outbound messages from a fragment stream.
//!
//! One [`StreamReconciler::run`] call handles one `/ask`:
//!
//! 1. **Starting**: send the placeholder as a reply to the command message.
//! 2. **AwaitingFirstFragment**: animate the placeholder while waiting for real text.
//! 3. **Streaming**: append each fragment to the current unit, edit it through the throttler,
//!    and start a new unit when the size bound would be exceeded.
//! 4. **Finalizing**: make the last unit show its full text and hand prompt and transcript to
//!    the sink.
//!
//! Only a failed placeholder send and a failed persistence call are returned as errors. Stream
//! errors and messaging failures end the run in [`ReconcilerState::Failed`] with a notice shown
//! to the user.

use std::time::Duration;

use arcanum_core::{Chat, MessageHandle, Messenger, MessagingError};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use llm_client::{Fragment, FragmentSource, FragmentStream};
use storage::{MessageSink, RepositoryError, Role};
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::indicator::{IndicatorSummary, LoadingIndicator};
use crate::splitter::split_message;
use crate::throttle::{send_with_retry, EditThrottler};

/// Telegram rejects messages above this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

// ---------- Settings & request ----------

/// Tuning and user-facing texts of the reconciler.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Size bound of one outbound message, in chars. At most [`TELEGRAM_MESSAGE_LIMIT`].
    pub safe_limit: usize,
    /// Pause after each fragment and minimum gap between edits.
    pub edit_interval: Duration,
    pub loading_interval: Duration,
    pub max_rate_limit_retries: u32,
    /// Indicator frames are this text followed by one to three dots.
    pub loading_text: String,
    /// Shown when the model stream breaks.
    pub apology_text: String,
    /// Shown when the messaging platform fails hard mid-reply.
    pub failure_text: String,
    /// Shown when the model produced no text.
    pub empty_text: String,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            safe_limit: 4000,
            edit_interval: Duration::from_millis(800),
            loading_interval: Duration::from_millis(700),
            max_rate_limit_retries: 5,
            loading_text: "Thinking".to_string(),
            apology_text: "Sorry, something went wrong while generating the answer. Please try again."
                .to_string(),
            failure_text: "Sorry, the answer could not be delivered.".to_string(),
            empty_text: "The model returned an empty answer.".to_string(),
        }
    }
}

/// One question to answer.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub chat: Chat,
    /// Message the placeholder replies to (the user's `/ask`).
    pub reply_to: Option<String>,
    /// Persisted chat the prompt and answer are appended to.
    pub session_id: i64,
    pub prompt: String,
    pub model: String,
}

// ---------- State & outcome ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Starting,
    AwaitingFirstFragment,
    Streaming,
    Finalizing,
    Done,
    Failed,
}

/// One user-visible message grown by edits. Only the last unit of a run is still edited.
#[derive(Debug, Clone)]
pub struct OutboundUnit {
    pub handle: MessageHandle,
    /// Text the message currently shows (as far as we know).
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl OutboundUnit {
    fn new(handle: MessageHandle, text: String) -> Self {
        Self {
            handle,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Result of a run that did not hit a setup or persistence failure.
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    /// `Done` or `Failed`.
    pub state: ReconcilerState,
    /// Every state entered, in order.
    pub trace: Vec<ReconcilerState>,
    pub transcript: String,
    pub units: Vec<OutboundUnit>,
    /// Prompt and transcript were appended to the sink.
    pub persisted: bool,
    pub indicator_frames: usize,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to send placeholder: {0}")]
    Setup(#[source] MessagingError),

    #[error("Failed to persist transcript: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Mutable state of one run.
struct StreamSession {
    state: ReconcilerState,
    trace: Vec<ReconcilerState>,
    /// Text of the current unit.
    accumulated: String,
    transcript: String,
    units: Vec<OutboundUnit>,
    throttler: EditThrottler,
    indicator_frames: usize,
    persisted: bool,
}

impl StreamSession {
    fn new(settings: &StreamSettings) -> Self {
        Self {
            state: ReconcilerState::Starting,
            trace: vec![ReconcilerState::Starting],
            accumulated: String::new(),
            transcript: String::new(),
            units: Vec::new(),
            throttler: EditThrottler::new(settings.edit_interval, settings.max_rate_limit_retries),
            indicator_frames: 0,
            persisted: false,
        }
    }

    fn enter(&mut self, state: ReconcilerState) {
        debug!(from = ?self.state, to = ?state, "State transition");
        self.state = state;
        self.trace.push(state);
    }

    fn into_outcome(self) -> StreamOutcome {
        StreamOutcome {
            state: self.state,
            trace: self.trace,
            transcript: self.transcript,
            units: self.units,
            persisted: self.persisted,
            indicator_frames: self.indicator_frames,
        }
    }
}

/// What woke the reconciler while the indicator was running.
enum Wake {
    Fragment(Option<Fragment>),
    IndicatorDone(IndicatorSummary),
}

// ---------- Reconciler ----------

pub struct StreamReconciler<'a> {
    messenger: &'a dyn Messenger,
    source: &'a dyn FragmentSource,
    settings: &'a StreamSettings,
    indicator: LoadingIndicator,
}

impl<'a> StreamReconciler<'a> {
    pub fn new(
        messenger: &'a dyn Messenger,
        source: &'a dyn FragmentSource,
        settings: &'a StreamSettings,
    ) -> Self {
        let indicator = LoadingIndicator::new(settings.loading_text.clone(), settings.loading_interval);
        Self {
            messenger,
            source,
            settings,
            indicator,
        }
    }

    /// **Entry point.** Answers `request` and appends prompt and answer to `sink`.
    ///
    /// The sink only receives appends; committing is up to the caller.
    #[instrument(
        skip_all,
        fields(chat_id = request.chat.id, session_id = request.session_id, model = %request.model)
    )]
    pub async fn run(
        &self,
        request: &StreamRequest,
        sink: &mut dyn MessageSink,
    ) -> Result<StreamOutcome, ReconcileError> {
        let mut session = StreamSession::new(self.settings);
        info!(prompt_len = request.prompt.chars().count(), "Starting streamed reply");

        let placeholder = self.indicator.frame(0);
        let handle = send_with_retry(
            self.messenger,
            &request.chat,
            &placeholder,
            request.reply_to.as_deref(),
            self.settings.max_rate_limit_retries,
        )
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to send placeholder");
            ReconcileError::Setup(e)
        })?;
        session.units.push(OutboundUnit::new(handle, placeholder));

        session.enter(ReconcilerState::AwaitingFirstFragment);
        let mut stream = self.source.open(&request.prompt, &request.model);
        let first = self.await_first_fragment(&mut stream, &mut session).await;

        let Some(first) = first else {
            info!("Stream ended without text");
            self.finalize(request, &mut session, sink).await?;
            return Ok(session.into_outcome());
        };

        let mut next = Some(first);

        while let Some(fragment) = next {
            match fragment {
                Fragment::Error(reason) => {
                    self.fail_with_apology(request, &mut session, sink, &reason).await?;
                    return Ok(session.into_outcome());
                }
                Fragment::Text(text) if text.is_empty() => {}
                Fragment::Text(text) => {
                    if session.state != ReconcilerState::Streaming {
                        session.enter(ReconcilerState::Streaming);
                    }
                    if let Err(e) = self.apply_text(request, &mut session, &text).await {
                        self.abort(&mut session, e).await;
                        return Ok(session.into_outcome());
                    }
                    sleep(self.settings.edit_interval).await;
                }
            }
            next = stream.next().await;
        }

        self.finalize(request, &mut session, sink).await?;
        Ok(session.into_outcome())
    }

    /// Waits for the first non-empty fragment (or the end of the stream) while the indicator
    /// animates the placeholder. The indicator is stopped and drained before returning.
    async fn await_first_fragment(
        &self,
        stream: &mut FragmentStream,
        session: &mut StreamSession,
    ) -> Option<Fragment> {
        let handle = session.units[0].handle.clone();
        let cancel = CancellationToken::new();
        let mut indicator =
            std::pin::pin!(self.indicator.run(self.messenger, &handle, cancel.clone()));
        let mut finished: Option<IndicatorSummary> = None;

        let first = loop {
            let wake = match finished {
                Some(_) => Wake::Fragment(stream.next().await),
                None => tokio::select! {
                    biased;
                    fragment = stream.next() => Wake::Fragment(fragment),
                    summary = indicator.as_mut() => Wake::IndicatorDone(summary),
                },
            };
            match wake {
                Wake::IndicatorDone(summary) => finished = Some(summary),
                Wake::Fragment(Some(fragment)) if fragment.is_empty() => {}
                Wake::Fragment(other) => break other,
            }
        };

        cancel.cancel();
        let summary = match finished {
            Some(summary) => summary,
            None => indicator.as_mut().await,
        };
        session.indicator_frames = summary.frames;
        session.units[0].text = self.indicator.frame(summary.frames);
        if let Some(at) = summary.last_edit {
            session.throttler.mark_edited(at);
        }
        first
    }

    /// Appends one fragment to the current unit, splitting into new units past the bound.
    /// An `Err` is a fatal messaging failure.
    async fn apply_text(
        &self,
        request: &StreamRequest,
        session: &mut StreamSession,
        text: &str,
    ) -> Result<(), MessagingError> {
        session.transcript.push_str(text);
        let candidate = format!("{}{}", session.accumulated, text);

        if candidate.chars().count() <= self.settings.safe_limit {
            session.accumulated = candidate;
            let current = session.accumulated.clone();
            return self.edit_current(session, &current).await;
        }

        let segments = split_message(&candidate, self.settings.safe_limit);
        debug!(segments = segments.len(), "Reply crossed the size bound");
        let Some((head, rest)) = segments.split_first() else {
            return Ok(());
        };
        self.edit_current(session, head).await?;

        let shown = session
            .units
            .last()
            .map(|unit| unit.text.clone())
            .unwrap_or_default();
        let carried = if shown == *head {
            rest.to_vec()
        } else {
            // The head edit was skipped; the unit keeps its previous text and the new
            // units start right after it.
            let Some(tail) = candidate.strip_prefix(shown.as_str()) else {
                return Err(MessagingError::Fatal(
                    "message could not be cut at the size bound".to_string(),
                ));
            };
            warn!(shown_len = shown.chars().count(), "Split edit skipped, carrying the rest");
            split_message(tail, self.settings.safe_limit)
        };
        session.accumulated = shown;

        for segment in &carried {
            let handle = send_with_retry(
                self.messenger,
                &request.chat,
                segment,
                None,
                self.settings.max_rate_limit_retries,
            )
            .await?;
            info!(message_id = %handle.message_id, unit = session.units.len(), "Started new message");
            session.units.push(OutboundUnit::new(handle, segment.clone()));
            session.accumulated = segment.clone();
        }
        Ok(())
    }

    /// Shows `text` in the current unit. Skips blank text and text that only differs from what
    /// is displayed by surrounding whitespace. `BadRequest` and exhausted rate limits are logged
    /// and skipped; `Fatal` is returned.
    async fn edit_current(&self, session: &mut StreamSession, text: &str) -> Result<(), MessagingError> {
        let StreamSession {
            units, throttler, ..
        } = session;
        let Some(unit) = units.last_mut() else {
            return Ok(());
        };
        if text.trim().is_empty() {
            return Ok(());
        }
        if text.trim() == unit.text.trim() {
            unit.text = text.to_string();
            return Ok(());
        }

        match throttler.edit(self.messenger, &unit.handle, text).await {
            Ok(()) => {
                unit.text = text.to_string();
                Ok(())
            }
            Err(e @ MessagingError::Fatal(_)) => Err(e),
            Err(e) => {
                warn!(message_id = %unit.handle.message_id, error = %e, "Edit skipped");
                Ok(())
            }
        }
    }

    /// Best-effort edit of the current unit to a notice; failures are only logged.
    async fn show_notice(&self, session: &mut StreamSession, notice: &str) {
        let StreamSession {
            units, throttler, ..
        } = session;
        let Some(unit) = units.last_mut() else {
            return;
        };
        match throttler.edit(self.messenger, &unit.handle, notice).await {
            Ok(()) => unit.text = notice.to_string(),
            Err(e) => warn!(message_id = %unit.handle.message_id, error = %e, "Failed to show notice"),
        }
    }

    async fn persist(
        &self,
        request: &StreamRequest,
        session: &mut StreamSession,
        sink: &mut dyn MessageSink,
    ) -> Result<(), ReconcileError> {
        for (role, content) in [
            (Role::User, request.prompt.as_str()),
            (Role::Model, session.transcript.as_str()),
        ] {
            if let Err(e) = sink.append_message(request.session_id, role, content).await {
                error!(role = %role, error = %e, "Failed to persist transcript");
                return Err(e.into());
            }
        }
        session.persisted = true;
        Ok(())
    }

    async fn finalize(
        &self,
        request: &StreamRequest,
        session: &mut StreamSession,
        sink: &mut dyn MessageSink,
    ) -> Result<(), ReconcileError> {
        session.enter(ReconcilerState::Finalizing);

        if session.transcript.trim().is_empty() {
            let notice = self.settings.empty_text.clone();
            self.show_notice(session, &notice).await;
            session.enter(ReconcilerState::Done);
            return Ok(());
        }

        let current = session.accumulated.clone();
        if let Err(e) = self.edit_current(session, &current).await {
            self.abort(session, e).await;
            return Ok(());
        }
        self.persist(request, session, sink).await?;
        session.enter(ReconcilerState::Done);
        info!(
            units = session.units.len(),
            transcript_len = session.transcript.chars().count(),
            "Streamed reply finished"
        );
        Ok(())
    }

    async fn fail_with_apology(
        &self,
        request: &StreamRequest,
        session: &mut StreamSession,
        sink: &mut dyn MessageSink,
        reason: &str,
    ) -> Result<(), ReconcileError> {
        warn!(reason, transcript_len = session.transcript.len(), "Model stream failed");
        session.enter(ReconcilerState::Failed);
        let apology = self.settings.apology_text.clone();
        self.show_notice(session, &apology).await;
        if !session.transcript.is_empty() {
            self.persist(request, session, sink).await?;
        }
        Ok(())
    }

    async fn abort(&self, session: &mut StreamSession, cause: MessagingError) {
        error!(error = %cause, "Messaging failed, aborting reply");
        session.enter(ReconcilerState::Failed);
        let notice = self.settings.failure_text.clone();
        self.show_notice(session, &notice).await;
    }
}
