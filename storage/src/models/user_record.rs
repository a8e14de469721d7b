//! User record model. Maps to the `users` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub telegram_id: i64,
    pub created_at: DateTime<Utc>,
}
