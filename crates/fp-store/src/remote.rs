use async_trait::async_trait;

use crate::config::BackendKind;
use crate::error::{StoreError, StoreResult};
use crate::payload::{Payload, StoredObject};
use crate::traits::StorageProvider;

/// Remote object-store provider (S3/R2 style).
///
/// Only the addressing is implemented: URLs are `{endpoint}/{bucket}/{key}`.
/// Every storage operation fails with [`StoreError::Unsupported`] until a
/// client is wired in.
#[derive(Debug, Clone)]
pub struct RemoteProvider {
    endpoint: String,
    bucket: String,
}

impl RemoteProvider {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
        }
    }

    fn unsupported<T>(operation: &'static str) -> StoreResult<T> {
        Err(StoreError::Unsupported {
            backend: "remote",
            operation,
        })
    }
}

#[async_trait]
impl StorageProvider for RemoteProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.endpoint.trim_end_matches('/'), self.bucket)
    }

    async fn upload(
        &self,
        _key: &str,
        _payload: Payload,
        _content_type: Option<&str>,
    ) -> StoreResult<String> {
        Self::unsupported("upload")
    }

    async fn get_object(&self, _key: &str) -> StoreResult<Option<StoredObject>> {
        Self::unsupported("get")
    }

    async fn list(&self, _prefix: &str) -> StoreResult<Vec<String>> {
        Self::unsupported("list")
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Self::unsupported("delete")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn operations_are_refused() {
        let p = RemoteProvider::new("https://r2.example.com/", "docs");
        assert_eq!(p.url_for("spaces/s/d/README.md"), "https://r2.example.com/docs/spaces/s/d/README.md");
        assert!(matches!(
            p.get("spaces/s/d/README.md").await,
            Err(StoreError::Unsupported { operation: "get", .. })
        ));
        assert!(p.upload("k", Payload::from("x"), None).await.is_err());
        assert!(p.list("spaces/").await.is_err());
        assert!(p.delete("k").await.is_err());
    }
}
