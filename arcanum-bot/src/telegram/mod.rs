//! Telegram framework layer: adapters, Messenger implementation, REPL runner.

mod adapters;
mod messenger;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use messenger::{classify_request_error, parse_message_id, TelegramMessenger};
pub use runner::run_repl;
