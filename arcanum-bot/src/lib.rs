//! # arcanum-bot
//!
//! The Telegram side of Arcanum: bot commands and their handlers, the teloxide [`Messenger`]
//! implementation, configuration, and start-up.
//!
//! ## Modules
//!
//! - [`cli`] – clap CLI (`run`, `init-db`)
//! - [`commands`] – the `BotCommands` enum registered with Telegram
//! - [`components`] – AppState shared by handlers
//! - [`config`] – BotConfig loaded from env
//! - [`handlers`] – /start, /help, /ask, /new, /chats
//! - [`runner`] – run_bot and init_db
//! - [`telegram`] – adapters, TelegramMessenger, REPL
//!
//! [`Messenger`]: arcanum_core::Messenger

pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod handlers;
pub mod runner;
pub mod telegram;

pub use commands::Command;
pub use components::AppState;
pub use config::{BaseConfig, BotConfig, StreamConfig};
pub use handlers::handle_message;
pub use runner::{init_db, run_bot};
pub use telegram::TelegramMessenger;
