//! Database Module
//!
//! SQLite document store: scalar fields are columns, embedded documents
//! (user snapshot, line items, raw gateway payloads) are JSON text.
//! Repositories are free functions over a `SqlitePool` or an executor.

pub mod cards;
pub mod orders;
pub mod payment_events;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// A stored value no longer parses into its domain type
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Cap for the reconnect backoff
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay before the next connection attempt after `attempt` consecutive failures:
/// `min(1s * 2^attempt, 30s)`
pub fn backoff_delay(attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(MAX_BACKOFF)
}

/// Open a pool with WAL journaling, create the file if missing
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Connect, retrying forever with capped exponential backoff
pub async fn connect_with_retry(database_url: &str) -> SqlitePool {
    let mut attempt: u32 = 0;
    loop {
        match connect(database_url).await {
            Ok(pool) => {
                tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");
                return pool;
            }
            Err(e) => {
                attempt = attempt.saturating_add(1);
                let delay = backoff_delay(attempt);
                tracing::error!(
                    attempt,
                    error = %e,
                    retry_in_secs = delay.as_secs(),
                    "Database connection failed"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Apply embedded migrations
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
        assert_eq!(backoff_delay(4), Duration::from_secs(16));
        assert_eq!(backoff_delay(5), Duration::from_secs(30));
        assert_eq!(backoff_delay(63), Duration::from_secs(30));
        assert_eq!(backoff_delay(200), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn connect_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let url = format!("sqlite://{}", path.display());

        let pool = connect(&url).await.unwrap();
        migrate(&pool).await.unwrap();
        assert!(path.exists());

        pool.close().await;
    }
}
