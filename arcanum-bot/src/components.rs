//! Shared state handed to every command handler.

use std::sync::Arc;

use arcanum_core::Messenger;
use llm_client::FragmentSource;
use storage::Database;
use stream_reply::StreamSettings;

/// Everything a handler needs. Cheap to clone; one clone per incoming message.
#[derive(Clone)]
pub struct AppState {
    pub messenger: Arc<dyn Messenger>,
    pub llm: Arc<dyn FragmentSource>,
    pub db: Database,
    pub stream: Arc<StreamSettings>,
    /// Model id passed to the fragment source.
    pub model: String,
}

impl AppState {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        llm: Arc<dyn FragmentSource>,
        db: Database,
        stream: StreamSettings,
        model: impl Into<String>,
    ) -> Self {
        Self {
            messenger,
            llm,
            db,
            stream: Arc::new(stream),
            model: model.into(),
        }
    }
}
