use async_trait::async_trait;

use crate::error::KeystoreError;

/// Key/value blob storage, abstracting over the actual backend.
///
/// The keystore only reads and overwrites; it never deletes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bytes stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KeystoreError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KeystoreError>;
}
