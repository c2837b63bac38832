//! SQLite document store.
//!
//! One `SqliteStore` implements every read port plus the atomic
//! [`TransactionPort`](crate::infrastructure::ports::TransactionPort). Reads go
//! straight to the pool (WAL lets them run beside a writer). Commits are
//! serialized behind a single async writer lock because SQLite allows one
//! writer at a time; the commit time is read from the clock while that lock is
//! held, so commit timestamps follow commit order.

mod commit;
mod repos;
mod rows;

#[cfg(test)]
mod tests;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tokio::sync::Mutex;

use crate::infrastructure::ports::{ClockPort, RepoError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS creatures (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        nickname TEXT,
        species TEXT NOT NULL,
        school TEXT NOT NULL,
        age TEXT NOT NULL,
        attributes_json TEXT NOT NULL,
        max_attributes_json TEXT NOT NULL,
        talents_json TEXT NOT NULL,
        listed INTEGER NOT NULL DEFAULT 0,
        released INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_creatures_owner ON creatures(owner_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS listings (
        id TEXT PRIMARY KEY,
        creature_id TEXT NOT NULL REFERENCES creatures(id),
        seller_id TEXT NOT NULL,
        seller_name TEXT NOT NULL,
        seller_contact TEXT,
        snapshot_json TEXT NOT NULL,
        price_currency TEXT NOT NULL,
        price_amount INTEGER NOT NULL,
        status TEXT NOT NULL,
        listed_at TEXT NOT NULL,
        withdrawn_at TEXT
    )
    "#,
    // At most one active listing per creature, whatever the application does.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_listings_one_active
        ON listings(creature_id) WHERE status = 'active'
    "#,
    "CREATE INDEX IF NOT EXISTS idx_listings_status ON listings(status, listed_at)",
    r#"
    CREATE TABLE IF NOT EXISTS threads (
        id TEXT PRIMARY KEY,
        author_id TEXT NOT NULL,
        author_name TEXT NOT NULL,
        persona_name TEXT,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        category TEXT NOT NULL,
        tags_json TEXT NOT NULL,
        attached_asset_json TEXT,
        reply_count INTEGER NOT NULL DEFAULT 0,
        last_reply_at TEXT NOT NULL,
        last_reply_author_name TEXT,
        is_pinned INTEGER NOT NULL DEFAULT 0,
        is_locked INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_threads_board ON threads(category, is_pinned, last_reply_at)",
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        thread_id TEXT NOT NULL REFERENCES threads(id),
        author_id TEXT NOT NULL,
        author_name TEXT NOT NULL,
        persona_name TEXT,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_posts_thread ON posts(thread_id, created_at)",
];

pub struct SqliteStore {
    pool: SqlitePool,
    writer: Mutex<()>,
    clock: Arc<dyn ClockPort>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and ensures the schema.
    pub async fn open(path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .map_err(|e| RepoError::database("open", e))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| RepoError::database("open", e))?;

        ensure_schema(&pool).await?;
        tracing::info!(path = %path, "SQLite store ready");

        Ok(Self {
            pool,
            writer: Mutex::new(()),
            clock,
        })
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("schema", e))?;
    }
    Ok(())
}
