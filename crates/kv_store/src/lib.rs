//! Device key-value storage for SmartHome
//!
//! Records are kept as serialized text under string keys. Stores receive a
//! [`KeyValueStore`] by injection so tests can swap the file-backed medium for
//! the in-memory one.

mod error;
mod file;
mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub use error::*;
pub use file::*;
pub use memory::*;

/// Trait for key-value storage access
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Gets the value stored under `key`
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Lists all keys that have values
    async fn keys(&self) -> StorageResult<Vec<String>>;

    /// Checks if a key has a value
    async fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get_item(key).await?.is_some())
    }
}

/// Reads and decodes the JSON record stored under `key`.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Option<T>> {
    match store.get_item(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw).await
}
