//! Chat session record model. Maps to the `chats` table.
//!
//! A user owns any number of chats; at most one of them is active at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatRecord {
    pub id: i64,
    pub user_id: i64,
    pub chat_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
