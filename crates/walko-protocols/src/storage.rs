//! Device-local key/value storage protocol.

use async_trait::async_trait;

use crate::error::StorageError;

/// Durable per-device string storage (the browser's `localStorage` or an
/// equivalent). Values are JSON documents.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Returns the storage ID.
    fn id(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
