//! # arcanum-core
//!
//! Core types shared by every crate of the bot: the [`Messenger`] boundary used to send and edit
//! outbound messages, user/chat types, [`ArcanumError`], and tracing initialization.
//! Transport-agnostic; the teloxide implementation lives in `arcanum-bot`.

pub mod error;
pub mod logger;
pub mod messenger;
pub mod types;

pub use error::{ArcanumError, Result};
pub use logger::init_tracing;
pub use messenger::{MessageHandle, Messenger, MessagingError};
pub use types::{Chat, IncomingMessage, ToCoreMessage, ToCoreUser, User};
