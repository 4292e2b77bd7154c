//! Persisted key-value channel.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::StoreError;

/// Change notification for a stored key.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Set { key: String, value: Value },
    Removed { key: String },
}

impl StoreEvent {
    pub fn key(&self) -> &str {
        match self {
            StoreEvent::Set { key, .. } | StoreEvent::Removed { key } => key,
        }
    }
}

/// Key-value storage shared between execution contexts.
///
/// Writes replace the whole value; there is no partial merge.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Subscribe to change notifications for all keys.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
