//! SQLite-backed state storage.
//!
//! One table, `fsm_storage(key TEXT PRIMARY KEY, value TEXT)`. State and data live in separate rows
//! keyed by [`DefaultKeyBuilder`]; writes are upserts (last write wins). Clearing a state or writing
//! empty data deletes the row.

use async_trait::async_trait;
use dbot_core::{Result, StateData, StateStorage, StorageKey};
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::key_builder::{DefaultKeyBuilder, KeyPart};
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SqliteStorage {
    pool_manager: SqlitePoolManager,
    key_builder: DefaultKeyBuilder,
}

impl SqliteStorage {
    pub async fn new(database_path: &str) -> std::result::Result<Self, StorageError> {
        Self::with_key_builder(database_path, DefaultKeyBuilder::default()).await
    }

    pub async fn with_key_builder(
        database_path: &str,
        key_builder: DefaultKeyBuilder,
    ) -> std::result::Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_path).await?;
        let storage = Self {
            pool_manager,
            key_builder,
        };
        storage.init().await?;
        Ok(storage)
    }

    async fn init(&self) -> std::result::Result<(), StorageError> {
        info!("Creating fsm_storage table if not exists");
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fsm_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM fsm_storage WHERE key = ?")
                .bind(key)
                .fetch_optional(self.pool_manager.pool())
                .await?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: Option<&str>) -> std::result::Result<(), StorageError> {
        let pool = self.pool_manager.pool();
        match value {
            Some(value) => {
                sqlx::query(
                    r#"
                    INSERT INTO fsm_storage (key, value) VALUES (?, ?)
                    ON CONFLICT(key) DO UPDATE SET value = excluded.value
                    "#,
                )
                .bind(key)
                .bind(value)
                .execute(pool)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM fsm_storage WHERE key = ?")
                    .bind(key)
                    .execute(pool)
                    .await?;
            }
        }
        debug!(key = %key, deleted = value.is_none(), "fsm row written");
        Ok(())
    }
}

#[async_trait]
impl StateStorage for SqliteStorage {
    #[instrument(skip(self, key, state), fields(key = %key))]
    async fn set_state(&self, key: &StorageKey, state: Option<&str>) -> Result<()> {
        let row_key = self.key_builder.build(key, KeyPart::State)?;
        self.write(&row_key, state).await?;
        Ok(())
    }

    async fn get_state(&self, key: &StorageKey) -> Result<Option<String>> {
        let row_key = self.key_builder.build(key, KeyPart::State)?;
        Ok(self.read(&row_key).await?)
    }

    #[instrument(skip(self, key, data), fields(key = %key))]
    async fn set_data(&self, key: &StorageKey, data: StateData) -> Result<()> {
        let row_key = self.key_builder.build(key, KeyPart::Data)?;
        if data.is_empty() {
            self.write(&row_key, None).await?;
        } else {
            let encoded = serde_json::to_string(&data).map_err(StorageError::from)?;
            self.write(&row_key, Some(&encoded)).await?;
        }
        Ok(())
    }

    async fn get_data(&self, key: &StorageKey) -> Result<StateData> {
        let row_key = self.key_builder.build(key, KeyPart::Data)?;
        match self.read(&row_key).await? {
            Some(encoded) => Ok(serde_json::from_str::<StateData>(&encoded).map_err(StorageError::from)?),
            None => Ok(StateData::new()),
        }
    }

    async fn close(&self) -> Result<()> {
        self.pool_manager.pool().close().await;
        Ok(())
    }
}
