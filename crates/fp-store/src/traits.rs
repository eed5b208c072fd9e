use async_trait::async_trait;

use crate::config::BackendKind;
use crate::error::StoreResult;
use crate::payload::{Payload, StoredObject};

/// Byte-addressable key-value storage.
///
/// All implementations must satisfy these rules:
/// - `get_object`/`get` on a missing key return `Ok(None)`.
/// - `upload` overwrites whatever is stored under the key. Concurrent
///   uploads to one key are last-writer-wins with no conflict detection.
/// - `list(prefix)` returns full keys, never metadata sidecars, sorted.
/// - `delete` of a missing key succeeds.
/// - I/O failures are propagated as errors.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Which backend variant this is.
    fn kind(&self) -> BackendKind;

    /// Absolute URL at which `key` can be fetched.
    fn url_for(&self, key: &str) -> String;

    /// Store `payload` under `key` and return its fetch URL.
    async fn upload(
        &self,
        key: &str,
        payload: Payload,
        content_type: Option<&str>,
    ) -> StoreResult<String>;

    /// Read the payload and recorded content type under `key`.
    async fn get_object(&self, key: &str) -> StoreResult<Option<StoredObject>>;

    /// List all keys starting with `prefix`.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Remove `key` and its metadata.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Read just the payload under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<Payload>> {
        Ok(self.get_object(key).await?.map(|obj| obj.payload))
    }

    /// Check whether anything is stored under `key`.
    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get_object(key).await?.is_some())
    }
}
