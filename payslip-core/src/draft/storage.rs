use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Backend(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage quota exceeded for key '{key}' ({size} bytes)")]
    QuotaExceeded { key: String, size: usize },
}

/// String key-value storage scoped to one user agent or profile.
#[async_trait]
pub trait DraftStorage: Send + Sync {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StorageError>;

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError>;

    /// Removing a key that does not exist is not an error.
    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StorageError>;
}

/// In-process storage. Optionally enforces a per-value size limit so callers
/// can exercise quota failures.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    max_value_len: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(max_value_len: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_value_len: Some(max_value_len),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl DraftStorage for MemoryStorage {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        if let Some(limit) = self.max_value_len {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                });
            }
        }
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(
        &self,
        key: &str,
    ) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
