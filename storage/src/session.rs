//! Database handle and per-interaction sessions.
//!
//! [`Database`] owns the pool. [`DbSession`] is one unit of work: its transaction is opened
//! lazily on the first statement, committed by [`DbSession::commit`], and rolled back when the
//! session is dropped without committing (including on error or panic paths).

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{debug, info};

use crate::chat_repo::ChatRepository;
use crate::error::{db_error, RepositoryError};
use crate::message_repo::MessageRepository;
use crate::schema::create_tables;
use crate::sqlite_pool::SqlitePoolManager;
use crate::user_repo::UserRepository;

/// Connected database with its schema in place.
#[derive(Clone)]
pub struct Database {
    pool_manager: SqlitePoolManager,
}

impl Database {
    /// Connects to `database_url` and creates missing tables.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool_manager = SqlitePoolManager::new(database_url)
            .await
            .map_err(db_error("Database::connect"))?;
        create_tables(pool_manager.pool()).await?;
        Ok(Self { pool_manager })
    }

    /// Runs a trivial query to prove the connection works.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(self.pool_manager.pool())
            .await
            .map_err(db_error("Database::ping"))?;
        Ok(())
    }

    /// Starts a new unit of work. No connection is taken until the first statement.
    pub fn session(&self) -> DbSession {
        DbSession {
            pool: self.pool_manager.pool().clone(),
            tx: None,
        }
    }

    /// Closes the pool; waits for checked-out connections to be returned.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool_manager.pool().close().await;
    }
}

/// One unit of work over the database. Repositories borrow it mutably.
pub struct DbSession {
    pool: sqlx::SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl DbSession {
    /// Returns the transaction's connection, beginning the transaction on first use.
    pub(crate) async fn conn(&mut self) -> Result<&mut SqliteConnection, RepositoryError> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => {
                debug!("Beginning transaction");
                self.pool.begin().await.map_err(db_error("DbSession::begin"))?
            }
        };
        Ok(&mut **self.tx.insert(tx))
    }

    pub fn users(&mut self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    pub fn chats(&mut self) -> ChatRepository<'_> {
        ChatRepository::new(self)
    }

    pub fn messages(&mut self) -> MessageRepository<'_> {
        MessageRepository::new(self)
    }

    /// True once a statement has run in this session.
    pub fn is_open(&self) -> bool {
        self.tx.is_some()
    }

    /// Commits everything written through this session. A session that never ran a statement
    /// commits trivially.
    pub async fn commit(self) -> Result<(), RepositoryError> {
        if let Some(tx) = self.tx {
            tx.commit().await.map_err(db_error("DbSession::commit"))?;
            debug!("Transaction committed");
        }
        Ok(())
    }

    /// Discards everything written through this session.
    pub async fn rollback(self) -> Result<(), RepositoryError> {
        if let Some(tx) = self.tx {
            tx.rollback().await.map_err(db_error("DbSession::rollback"))?;
            debug!("Transaction rolled back");
        }
        Ok(())
    }
}
