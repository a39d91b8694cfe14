//! SQLite connection pool wrapper.
//!
//! Provides [`SqlitePoolManager`] to create a single pool per database path; the database file
//! is created if it does not exist.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const MEMORY_URLS: [&str; 2] = [":memory:", "sqlite::memory:"];

/// Manages a single SQLite pool; creates the database file if missing.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    /// Creates a pool for the given file path, or a single-connection in-memory database for
    /// `:memory:` / `sqlite::memory:`.
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        info!(database_path = %database_path, "Initializing SQLite pool");

        let pool = if MEMORY_URLS.contains(&database_path) {
            // Each in-memory connection is its own database, so keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
                .await?
        } else {
            let options = SqliteConnectOptions::new()
                .create_if_missing(true)
                .filename(database_path);
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
