use async_trait::async_trait;

use super::error::StorageError;
use super::key::BlobKey;

/// Key-addressed blob storage.
///
/// Implementations hold no per-request state; every call is an independent
/// round trip to the backing store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key` and return the location reported by the backend.
    ///
    /// An existing blob under the same key is overwritten.
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<String, StorageError>;

    /// Retrieve all bytes for a blob.
    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, key: &BlobKey) -> Result<(), StorageError>;
}
