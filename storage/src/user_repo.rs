//! User repository: lookup and creation by Telegram id.

use chrono::Utc;
use tracing::debug;

use crate::error::{db_error, RepositoryError};
use crate::models::UserRecord;
use crate::session::DbSession;

pub struct UserRepository<'a> {
    session: &'a mut DbSession,
}

impl<'a> UserRepository<'a> {
    pub(crate) fn new(session: &'a mut DbSession) -> Self {
        Self { session }
    }

    pub async fn get_by_telegram_id(
        &mut self,
        telegram_id: i64,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        debug!(telegram_id, "Getting user by Telegram ID");
        let conn = self.session.conn().await?;
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, telegram_id, created_at FROM users WHERE telegram_id = ?",
        )
        .bind(telegram_id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("UserRepository::get_by_telegram_id"))?;

        match &user {
            Some(u) => debug!(telegram_id, user_id = u.id, "User found"),
            None => debug!(telegram_id, "User not found"),
        }
        Ok(user)
    }

    /// Inserts a user. Fails with a database error if the Telegram id is already registered.
    pub async fn create(&mut self, telegram_id: i64) -> Result<UserRecord, RepositoryError> {
        debug!(telegram_id, "Creating user");
        let conn = self.session.conn().await?;
        let user = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (telegram_id, created_at) VALUES (?, ?) \
             RETURNING id, telegram_id, created_at",
        )
        .bind(telegram_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(db_error("UserRepository::create"))?;
        Ok(user)
    }

    /// Returns the existing user or creates one. The flag is true when the user was created.
    pub async fn get_or_create(
        &mut self,
        telegram_id: i64,
    ) -> Result<(UserRecord, bool), RepositoryError> {
        if let Some(user) = self.get_by_telegram_id(telegram_id).await? {
            return Ok((user, false));
        }
        let user = self.create(telegram_id).await?;
        Ok((user, true))
    }
}
