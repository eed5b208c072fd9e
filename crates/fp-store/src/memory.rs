use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::config::BackendKind;
use crate::error::StoreResult;
use crate::keys::{public_url, validate_key};
use crate::payload::{Payload, StoredObject};
use crate::traits::StorageProvider;

/// In-memory, HashMap-based provider.
///
/// Contents live for the lifetime of the provider and are lost on restart.
/// The map sits behind a `RwLock` that is never held across an await point,
/// so racing uploads to one key simply leave the last writer's bytes.
pub struct InMemoryProvider {
    objects: RwLock<HashMap<String, StoredObject>>,
    base_url: String,
}

impl InMemoryProvider {
    /// Create an empty provider whose URLs are rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes across all keys.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|obj| obj.payload.len() as u64)
            .sum()
    }
}

impl std::fmt::Debug for InMemoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryProvider")
            .field("key_count", &self.len())
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl StorageProvider for InMemoryProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn url_for(&self, key: &str) -> String {
        public_url(&self.base_url, key)
    }

    async fn upload(
        &self,
        key: &str,
        payload: Payload,
        content_type: Option<&str>,
    ) -> StoreResult<String> {
        validate_key(key)?;
        debug!(key, bytes = payload.len(), "memory upload");
        let object = StoredObject::new(payload, content_type);
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), object);
        Ok(self.url_for(key))
    }

    async fn get_object(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        validate_key(key)?;
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let map = self.objects.read().expect("lock poisoned");
        let mut keys: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.objects.write().expect("lock poisoned").remove(key);
        Ok(())
    }
}
