//! Process-local state storage. Lost on restart; intended for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use dbot_core::{Result, StateData, StateStorage, StorageKey};
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone)]
struct Record {
    state: Option<String>,
    data: StateData,
}

impl Record {
    fn is_empty(&self) -> bool {
        self.state.is_none() && self.data.is_empty()
    }
}

/// In-memory [`StateStorage`]: one record per key, created on first write and removed once both
/// state and data are cleared.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<StorageKey, Record>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that currently hold a record.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Applies `change` to the record at `key`, dropping the record if it ends up empty.
    async fn modify<T>(&self, key: &StorageKey, change: impl FnOnce(&mut Record) -> T) -> T {
        let mut records = self.records.write().await;
        let record = records.entry(key.clone()).or_default();
        let out = change(record);
        if record.is_empty() {
            records.remove(key);
        }
        out
    }
}

#[async_trait]
impl StateStorage for MemoryStorage {
    async fn set_state(&self, key: &StorageKey, state: Option<&str>) -> Result<()> {
        self.modify(key, |r| r.state = state.map(str::to_string)).await;
        Ok(())
    }

    async fn get_state(&self, key: &StorageKey) -> Result<Option<String>> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .and_then(|r| r.state.clone()))
    }

    async fn set_data(&self, key: &StorageKey, data: StateData) -> Result<()> {
        self.modify(key, |r| r.data = data).await;
        Ok(())
    }

    async fn get_data(&self, key: &StorageKey) -> Result<StateData> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .map(|r| r.data.clone())
            .unwrap_or_default())
    }

    async fn update_data(&self, key: &StorageKey, patch: StateData) -> Result<StateData> {
        // One write lock per merge: concurrent patches to the same key are not lost.
        Ok(self
            .modify(key, |r| {
                r.data.extend(patch);
                r.data.clone()
            })
            .await)
    }
}
