//! Storage crate: users, chat sessions and chat messages in SQLite.
//!
//! ## Modules
//!
//! - [`error`] – RepositoryError, the single error kind of this crate
//! - [`models`] – UserRecord, ChatRecord, MessageRecord, Role
//! - [`session`] – Database (pool + schema) and DbSession (one unit of work)
//! - [`user_repo`], [`chat_repo`], [`message_repo`] – repositories borrowed from a DbSession
//! - [`sink`] – MessageSink, the append-only contract used by the streaming engine
//! - [`sqlite_pool`] – SqlitePoolManager

mod chat_repo;
mod error;
mod message_repo;
mod models;
mod schema;
mod session;
mod sink;
mod sqlite_pool;
mod user_repo;

pub use chat_repo::ChatRepository;
pub use error::RepositoryError;
pub use message_repo::MessageRepository;
pub use models::{ChatRecord, MessageRecord, Role, UserRecord};
pub use schema::create_tables;
pub use session::{Database, DbSession};
pub use sink::MessageSink;
pub use sqlite_pool::SqlitePoolManager;
pub use user_repo::UserRepository;
