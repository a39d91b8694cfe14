//! Conversation state (FSM) interface.
//!
//! A [`StateStorage`] holds one state name and one data map per [`StorageKey`]. Records are created
//! lazily: an absent key reads as no state and empty data. Implementations live in the `storage` crate.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Key/value bag stored next to the state name.
pub type StateData = serde_json::Map<String, serde_json::Value>;

/// Discriminator used when a handler does not ask for a specific one.
pub const DEFAULT_DESTINY: &str = "default";

/// Identifies one conversation context: bot, chat, user and discriminator ("destiny").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub bot_id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub destiny: String,
}

impl StorageKey {
    pub fn new(bot_id: i64, chat_id: i64, user_id: i64) -> Self {
        Self {
            bot_id,
            chat_id,
            user_id,
            destiny: DEFAULT_DESTINY.to_string(),
        }
    }

    pub fn with_destiny(mut self, destiny: impl Into<String>) -> Self {
        self.destiny = destiny.into();
        self
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.bot_id, self.chat_id, self.user_id, self.destiny
        )
    }
}

/// External key/value store for per-conversation state. Must be safe for concurrent use;
/// last write wins per key.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Sets the state name; `None` clears it.
    async fn set_state(&self, key: &StorageKey, state: Option<&str>) -> Result<()>;
    async fn get_state(&self, key: &StorageKey) -> Result<Option<String>>;
    /// Replaces the data map; an empty map clears it.
    async fn set_data(&self, key: &StorageKey, data: StateData) -> Result<()>;
    async fn get_data(&self, key: &StorageKey) -> Result<StateData>;

    /// Merges `patch` into the stored data and returns the result.
    async fn update_data(&self, key: &StorageKey, patch: StateData) -> Result<StateData> {
        let mut data = self.get_data(key).await?;
        data.extend(patch);
        self.set_data(key, data.clone()).await?;
        Ok(data)
    }

    /// Releases backend resources.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// State of one conversation, bound to its key. Handed to handlers through the update context.
#[derive(Clone)]
pub struct FsmContext {
    storage: Arc<dyn StateStorage>,
    key: StorageKey,
}

impl FsmContext {
    pub fn new(storage: Arc<dyn StateStorage>, key: StorageKey) -> Self {
        Self { storage, key }
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub async fn get_state(&self) -> Result<Option<String>> {
        self.storage.get_state(&self.key).await
    }

    pub async fn set_state(&self, state: Option<&str>) -> Result<()> {
        self.storage.set_state(&self.key, state).await
    }

    pub async fn get_data(&self) -> Result<StateData> {
        self.storage.get_data(&self.key).await
    }

    pub async fn set_data(&self, data: StateData) -> Result<()> {
        self.storage.set_data(&self.key, data).await
    }

    pub async fn update_data(&self, patch: StateData) -> Result<StateData> {
        self.storage.update_data(&self.key, patch).await
    }

    /// Drops both the state name and the data of this conversation.
    pub async fn clear(&self) -> Result<()> {
        self.storage.set_state(&self.key, None).await?;
        self.storage.set_data(&self.key, StateData::new()).await
    }
}

impl fmt::Debug for FsmContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsmContext").field("key", &self.key).finish()
    }
}
