//! Key-value storage for cached emoji data.
//!
//! Provides a `StorageBackend` trait for raw string storage and a typed
//! `Storage` wrapper that serializes values as JSON and validates their shape
//! on read. Two backends ship with the crate: `InMemoryStorage` (process
//! scoped, used for the session marker) and `SqliteStorage` (durable, used
//! for the per-locale data cache).

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// Key of the process-scoped support marker.
pub const SESSION_METADATA_KEY: &str = "emoji-picker/metadata";

/// Prefix of the durable per-locale data keys.
pub const LOCAL_DATA_KEY_PREFIX: &str = "emoji-picker/data/";

/// Returns the durable storage key for a locale.
pub fn local_data_key(locale: &str) -> String {
    format!("{LOCAL_DATA_KEY_PREFIX}{locale}")
}

/// Backend trait for raw string storage.
///
/// Implementations only move strings around; serialization and shape
/// validation live in [`Storage`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get the raw value for a key.
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set the raw value for a key.
    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete a key.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Get all keys matching a prefix.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Typed storage wrapper.
///
/// Reads never fail: a backend error, a payload that isn't valid JSON for
/// `T`, or one rejected by the validator are all reported as a missing entry.
///
/// # Example
///
/// ```ignore
/// use emoji_lib::storage::{InMemoryStorage, Storage};
///
/// let storage = Storage::new(InMemoryStorage::new());
/// storage.set("answer", &42u32).await?;
///
/// let value: Option<u32> = storage.get("answer", |v| *v < 100).await;
/// assert_eq!(value, Some(42));
/// ```
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Create a new storage wrapper around a backend.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Create a storage wrapper from a shared backend.
    pub fn from_arc(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Get a typed value, discarding it unless `validate` accepts it.
    pub async fn get<T, V>(&self, key: &str, validate: V) -> Option<T>
    where
        T: DeserializeOwned,
        V: FnOnce(&T) -> bool,
    {
        let raw = match self.backend.get_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("[storage] failed to read {key}: {e}");
                return None;
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) if validate(&value) => Some(value),
            Ok(_) => {
                log::debug!("[storage] discarding invalid entry {key}");
                None
            }
            Err(e) => {
                log::debug!("[storage] discarding malformed entry {key}: {e}");
                None
            }
        }
    }

    /// Set a typed value.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_raw(key, raw).await
    }

    /// Delete a key.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key).await
    }

    /// Get all keys matching a prefix.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.backend.keys_with_prefix(prefix).await
    }
}

impl<B: StorageBackend + 'static> From<B> for Storage {
    fn from(backend: B) -> Self {
        Self::new(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_validation() {
        let storage = Storage::new(InMemoryStorage::new());
        storage.set("answer", &42u32).await.unwrap();

        assert_eq!(storage.get::<u32, _>("answer", |_| true).await, Some(42));
        assert_eq!(storage.get::<u32, _>("answer", |v| *v > 100).await, None);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_miss() {
        let backend = InMemoryStorage::new();
        backend.set_raw("broken", "{not json".to_string()).await.unwrap();
        backend.set_raw("wrong-shape", "\"text\"".to_string()).await.unwrap();
        let storage = Storage::new(backend);

        assert_eq!(storage.get::<u32, _>("broken", |_| true).await, None);
        assert_eq!(storage.get::<u32, _>("wrong-shape", |_| true).await, None);
        assert_eq!(storage.get::<u32, _>("missing", |_| true).await, None);
    }

    #[test]
    fn test_local_data_key() {
        assert_eq!(local_data_key("en-gb"), "emoji-picker/data/en-gb");
    }
}
