//! Table creation. Idempotent; run once at start-up.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{db_error, RepositoryError};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        telegram_id INTEGER NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        chat_name TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    "#,
    // At most one active chat per user.
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_chats_one_active ON chats(user_id) WHERE is_active = 1",
    "CREATE INDEX IF NOT EXISTS idx_chats_user_id ON chats(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        chat_id INTEGER NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_messages_chat_created ON messages(chat_id, created_at)",
];

/// Creates all tables and indexes if they do not exist.
pub async fn create_tables(pool: &SqlitePool) -> Result<(), RepositoryError> {
    info!("Creating database tables if not exist");

    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(db_error("create_tables"))?;
    }

    info!("Database tables created successfully");
    Ok(())
}
