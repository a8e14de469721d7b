//! # stream-reply
//!
//! Turns an LLM [`FragmentStream`](llm_client::FragmentStream) into one or more Telegram messages
//! that grow by in-place edits.
//!
//! - [`split_message`]: sentence-aware partitioning under the message size bound.
//! - [`EditThrottler`]: paces edits and absorbs rate limits.
//! - [`LoadingIndicator`]: placeholder animation until the first fragment.
//! - [`StreamReconciler`]: the state machine tying them together and handing the finished
//!   transcript to a [`MessageSink`](storage::MessageSink).

pub mod indicator;
pub mod reconciler;
pub mod splitter;
pub mod throttle;

pub use indicator::{IndicatorSummary, LoadingIndicator};
pub use reconciler::{
    OutboundUnit, ReconcileError, ReconcilerState, StreamOutcome, StreamReconciler, StreamRequest,
    StreamSettings, TELEGRAM_MESSAGE_LIMIT,
};
pub use splitter::split_message;
pub use throttle::{send_with_retry, EditThrottler};
