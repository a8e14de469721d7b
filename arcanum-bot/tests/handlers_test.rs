//! Command handlers against an in-memory database, a recording messenger and a scripted model.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arcanum_bot::handlers::{ensure_active_chat, handle_ask, handle_new};
use arcanum_bot::{handle_message, AppState};
use arcanum_core::{Chat, IncomingMessage, MessageHandle, Messenger, MessagingError, User};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use llm_client::{Fragment, FragmentSource, FragmentStream};
use storage::{Database, Role};
use stream_reply::StreamSettings;

const BOT: &str = "arcanum_bot";
const TELEGRAM_ID: i64 = 7001;

#[derive(Default)]
struct RecordingMessenger {
    sends: Mutex<Vec<(String, Option<String>)>>,
    edits: Mutex<Vec<(String, String)>>,
}

impl RecordingMessenger {
    fn sent_texts(&self) -> Vec<String> {
        self.sends.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    fn last_sent(&self) -> String {
        self.sent_texts().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(
        &self,
        chat: &Chat,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<MessageHandle, MessagingError> {
        let mut sends = self.sends.lock().unwrap();
        sends.push((text.to_string(), reply_to.map(String::from)));
        Ok(MessageHandle::new(chat.id, (100 + sends.len()).to_string()))
    }

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), MessagingError> {
        self.edits
            .lock()
            .unwrap()
            .push((handle.message_id.clone(), text.to_string()));
        Ok(())
    }
}

struct ScriptedModel {
    fragments: Vec<Fragment>,
}

impl FragmentSource for ScriptedModel {
    fn open(&self, _prompt: &str, _model: &str) -> FragmentStream {
        stream::iter(self.fragments.clone()).boxed()
    }
}

async fn setup(fragments: Vec<Fragment>) -> (AppState, Arc<RecordingMessenger>) {
    let messenger = Arc::new(RecordingMessenger::default());
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let settings = StreamSettings {
        edit_interval: Duration::from_millis(5),
        loading_interval: Duration::from_secs(60),
        ..StreamSettings::default()
    };
    let state = AppState::new(
        messenger.clone(),
        Arc::new(ScriptedModel { fragments }),
        db,
        settings,
        "gemini-2.5-flash",
    );
    (state, messenger)
}

fn message(text: &str) -> IncomingMessage {
    IncomingMessage {
        id: "55".to_string(),
        user: User {
            id: TELEGRAM_ID,
            username: Some("ada".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 9,
            chat_type: "private".to_string(),
        },
        text: text.to_string(),
    }
}

fn text(s: &str) -> Fragment {
    Fragment::Text(s.to_string())
}

#[tokio::test]
async fn test_start_greets_new_then_returning_user() {
    let (state, messenger) = setup(vec![]).await;

    handle_message(&state, &message("/start"), BOT).await.unwrap();
    assert!(messenger.last_sent().starts_with("Hello, Ada!"));

    handle_message(&state, &message("/start"), BOT).await.unwrap();
    assert_eq!(messenger.last_sent(), "Welcome back, Ada! How can I help?");
}

#[tokio::test]
async fn test_help_lists_commands() {
    let (state, messenger) = setup(vec![]).await;

    handle_message(&state, &message("/help"), BOT).await.unwrap();

    let help = messenger.last_sent();
    assert!(help.contains("/ask"));
    assert!(help.contains("/chats"));
}

#[tokio::test]
async fn test_plain_text_and_unknown_commands_are_ignored() {
    let (state, messenger) = setup(vec![]).await;

    handle_message(&state, &message("hello there"), BOT).await.unwrap();
    handle_message(&state, &message("/weather"), BOT).await.unwrap();

    assert!(messenger.sent_texts().is_empty());
}

#[tokio::test]
async fn test_ask_streams_reply_and_persists_both_sides() {
    let (state, messenger) = setup(vec![text("Hello"), text(" world")]).await;

    handle_message(&state, &message("/ask What?"), BOT).await.unwrap();

    let sends = messenger.sends.lock().unwrap().clone();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0], ("Thinking.".to_string(), Some("55".to_string())));
    let edits = messenger.edits.lock().unwrap().clone();
    assert_eq!(edits.last().unwrap().1, "Hello world");

    let mut session = state.db.session();
    let (user, created) = session.users().get_or_create(TELEGRAM_ID).await.unwrap();
    assert!(!created);
    let active = session.chats().get_active(user.id).await.unwrap().unwrap();
    assert_eq!(active.chat_name, "Chat 1");
    let stored = session.messages().list_for_chat(active.id).await.unwrap();
    let stored: Vec<(Role, String)> = stored.into_iter().map(|m| (m.role, m.content)).collect();
    assert_eq!(
        stored,
        vec![
            (Role::User, "What?".to_string()),
            (Role::Model, "Hello world".to_string())
        ]
    );
}

#[tokio::test]
async fn test_ask_without_question_shows_usage() {
    let (state, messenger) = setup(vec![text("unused")]).await;

    handle_ask(&state, &message("/ask"), "   ").await.unwrap();

    assert!(messenger.last_sent().starts_with("Please add a question"));
    let mut session = state.db.session();
    let (user, _) = session.users().get_or_create(TELEGRAM_ID).await.unwrap();
    assert!(session.chats().list_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ask_reuses_active_chat() {
    let (state, _messenger) = setup(vec![text("ok")]).await;

    handle_message(&state, &message("/ask one"), BOT).await.unwrap();
    handle_message(&state, &message("/ask two"), BOT).await.unwrap();

    let mut session = state.db.session();
    let (user, _) = session.users().get_or_create(TELEGRAM_ID).await.unwrap();
    let chats = session.chats().list_for_user(user.id).await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(session.messages().count_for_chat(chats[0].id).await.unwrap(), 4);
}

#[tokio::test]
async fn test_failed_stream_keeps_prompt_out_of_history() {
    let (state, messenger) = setup(vec![Fragment::Error("quota".to_string())]).await;

    handle_message(&state, &message("/ask Why?"), BOT).await.unwrap();

    let edits = messenger.edits.lock().unwrap().clone();
    assert!(edits.last().unwrap().1.starts_with("Sorry"));
    let chat_id = ensure_active_chat(&state.db, TELEGRAM_ID).await.unwrap();
    let mut session = state.db.session();
    assert_eq!(session.messages().count_for_chat(chat_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_ensure_active_chat_is_stable() {
    let (state, _messenger) = setup(vec![]).await;

    let first = ensure_active_chat(&state.db, TELEGRAM_ID).await.unwrap();
    let second = ensure_active_chat(&state.db, TELEGRAM_ID).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_new_deactivates_previous_chat() {
    let (state, messenger) = setup(vec![text("ok")]).await;

    handle_message(&state, &message("/ask hi"), BOT).await.unwrap();
    handle_message(&state, &message("/new Work"), BOT).await.unwrap();
    assert_eq!(messenger.last_sent(), "Started a new chat: Work");

    let mut session = state.db.session();
    let (user, _) = session.users().get_or_create(TELEGRAM_ID).await.unwrap();
    let chats = session.chats().list_for_user(user.id).await.unwrap();
    let summary: Vec<(String, bool)> = chats
        .into_iter()
        .map(|c| (c.chat_name, c.is_active))
        .collect();
    assert_eq!(
        summary,
        vec![("Chat 1".to_string(), false), ("Work".to_string(), true)]
    );
}

#[tokio::test]
async fn test_new_without_name_numbers_the_chat() {
    let (state, messenger) = setup(vec![]).await;

    handle_new(&state, &message("/new"), "").await.unwrap();
    handle_new(&state, &message("/new"), "  ").await.unwrap();

    assert_eq!(messenger.last_sent(), "Started a new chat: Chat 2");
}

#[tokio::test]
async fn test_chats_lists_and_marks_active() {
    let (state, messenger) = setup(vec![]).await;

    handle_message(&state, &message("/chats"), BOT).await.unwrap();
    assert!(messenger.last_sent().starts_with("You have no chats yet"));

    handle_message(&state, &message("/new Research"), BOT).await.unwrap();
    handle_message(&state, &message("/new Travel"), BOT).await.unwrap();
    handle_message(&state, &message("/chats"), BOT).await.unwrap();

    assert_eq!(
        messenger.last_sent(),
        "Your chats:\n1. Research\n2. Travel (active)"
    );
}
