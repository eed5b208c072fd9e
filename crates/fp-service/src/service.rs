use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use fp_crypto::ContentHasher;
use fp_store::{keys, Payload, StorageProvider, StoredObject};
use fp_types::{now, validate_segment, version_token, Asset, UploadReceipt};

use crate::error::{ServiceError, ServiceResult};
use crate::limits::SizeLimits;

/// Body returned for a document that has never been saved.
pub const DEFAULT_MARKDOWN: &str = "# Untitled Document\n";

/// Content type recorded for Markdown bodies.
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// Media type reported when nothing better is known.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Result of a Markdown save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    /// Write-time token (unix millis).
    pub version: String,
    /// Truncated SHA-256 of the saved body.
    pub etag: String,
}

/// Result of a Markdown read.
///
/// `version` is generated when the body is read, not when it was written:
/// it identifies this response, and must not be compared against a
/// [`SaveReceipt::version`]. Use `etag` for change detection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownBody {
    pub markdown: String,
    pub version: String,
    /// Etag of the stored body; `None` when the placeholder was returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// An asset as received from the editor.
#[derive(Clone, Debug)]
pub struct AssetUpload {
    pub name: String,
    pub content: Bytes,
    pub content_type: String,
}

/// Markdown and asset storage over a pluggable provider.
///
/// Saves are serialized through an internal gate so that a conditional save
/// compares and writes without another save landing in between. Reads are
/// never blocked by it.
pub struct StorageService {
    provider: Arc<dyn StorageProvider>,
    limits: SizeLimits,
    save_gate: Mutex<()>,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("backend", &self.provider.kind())
            .field("limits", &self.limits)
            .finish()
    }
}

impl StorageService {
    pub fn new(provider: Arc<dyn StorageProvider>, limits: SizeLimits) -> Self {
        Self {
            provider,
            limits,
            save_gate: Mutex::new(()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    pub fn limits(&self) -> &SizeLimits {
        &self.limits
    }

    // ---------------------------------------------------------------
    // Markdown bodies
    // ---------------------------------------------------------------

    /// Overwrite the body of `space_id/doc_slug`. Last writer wins.
    pub async fn save_markdown(
        &self,
        space_id: &str,
        doc_slug: &str,
        markdown: &str,
    ) -> ServiceResult<SaveReceipt> {
        self.save_markdown_if(space_id, doc_slug, markdown, None).await
    }

    /// Overwrite the body, optionally only if its current etag equals
    /// `expected_etag`.
    ///
    /// A body that does not exist yet has no etag, so any expected etag
    /// conflicts with it.
    pub async fn save_markdown_if(
        &self,
        space_id: &str,
        doc_slug: &str,
        markdown: &str,
        expected_etag: Option<&str>,
    ) -> ServiceResult<SaveReceipt> {
        validate_segment("space id", space_id)?;
        validate_segment("slug", doc_slug)?;
        if markdown.is_empty() {
            return Err(ServiceError::Validation("markdown content is required".into()));
        }

        let key = keys::markdown_key(space_id, doc_slug);
        let _gate = self.save_gate.lock().await;

        if let Some(expected) = expected_etag {
            let current = self
                .provider
                .get(&key)
                .await?
                .filter(|p| !p.is_empty())
                .map(|p| ContentHasher::ETAG.hash(p.as_bytes()));
            if current.as_deref() != Some(expected) {
                debug!(key = %key, expected, ?current, "conditional save rejected");
                return Err(ServiceError::Conflict {
                    expected: expected.to_string(),
                    current,
                });
            }
        }

        self.provider
            .upload(&key, Payload::from(markdown), Some(MARKDOWN_CONTENT_TYPE))
            .await?;

        let receipt = SaveReceipt {
            version: version_token(),
            etag: ContentHasher::ETAG.hash(markdown.as_bytes()),
        };
        info!(key = %key, bytes = markdown.len(), etag = %receipt.etag, "saved markdown");
        Ok(receipt)
    }

    /// Read the body of `space_id/doc_slug`, substituting the placeholder
    /// when nothing (or an empty body) is stored.
    pub async fn get_markdown(&self, space_id: &str, doc_slug: &str) -> ServiceResult<MarkdownBody> {
        validate_segment("space id", space_id)?;
        validate_segment("slug", doc_slug)?;

        let key = keys::markdown_key(space_id, doc_slug);
        let stored = self
            .provider
            .get(&key)
            .await?
            .map(Payload::into_text_lossy)
            .filter(|s| !s.is_empty());

        let body = match stored {
            Some(markdown) => {
                let etag = ContentHasher::ETAG.hash(markdown.as_bytes());
                MarkdownBody {
                    markdown,
                    version: version_token(),
                    etag: Some(etag),
                }
            }
            None => {
                debug!(key = %key, "no stored body, returning placeholder");
                MarkdownBody {
                    markdown: DEFAULT_MARKDOWN.to_string(),
                    version: version_token(),
                    etag: None,
                }
            }
        };
        Ok(body)
    }

    // ---------------------------------------------------------------
    // Assets
    // ---------------------------------------------------------------

    /// Store an asset under its content-addressed key.
    ///
    /// Re-uploading identical bytes under the same name overwrites the same
    /// key. Only the last path component of `upload.name` is used.
    pub async fn upload_asset(
        &self,
        space_id: &str,
        doc_slug: &str,
        upload: AssetUpload,
    ) -> ServiceResult<UploadReceipt> {
        validate_segment("space id", space_id)?;
        validate_segment("slug", doc_slug)?;

        let name = file_name_component(&upload.name);
        if name.is_empty() || name == "." || name == ".." {
            return Err(ServiceError::Validation("file name is required".into()));
        }
        let media_type = if upload.content_type.is_empty() {
            DEFAULT_MEDIA_TYPE.to_string()
        } else {
            upload.content_type
        };
        self.limits.check(&media_type, upload.content.len() as u64)?;

        let hash = ContentHasher::ASSET.hash(&upload.content);
        let key = keys::asset_key_with_hash(space_id, doc_slug, name, &hash);
        let size = upload.content.len();
        let url = self
            .provider
            .upload(&key, Payload::from(upload.content), Some(&media_type))
            .await?;

        info!(key = %key, bytes = size, media_type = %media_type, "uploaded asset");
        Ok(UploadReceipt {
            url,
            rel_path: keys::rel_path(&key),
            media_type,
            hash,
        })
    }

    /// List the assets stored for a document.
    ///
    /// Entries are built from keys alone: `size` is 0, `hash` is empty and
    /// the media type is generic. Only [`Self::upload_asset`] reports real
    /// values.
    pub async fn list_assets(&self, space_id: &str, doc_slug: &str) -> ServiceResult<Vec<Asset>> {
        validate_segment("space id", space_id)?;
        validate_segment("slug", doc_slug)?;

        let prefix = keys::asset_prefix(space_id, doc_slug);
        let keys = self.provider.list(&prefix).await?;
        let listed_at = now();
        Ok(keys
            .into_iter()
            .map(|key| Asset {
                space_id: space_id.to_string(),
                doc_id: doc_slug.to_string(),
                rel_path: keys::rel_path(&key),
                url: self.provider.url_for(&key),
                media_type: DEFAULT_MEDIA_TYPE.to_string(),
                size: 0,
                hash: String::new(),
                updated_at: listed_at,
            })
            .collect())
    }

    /// Read a raw stored object by key (used to serve `/storage/...`).
    pub async fn read_object(&self, key: &str) -> ServiceResult<Option<StoredObject>> {
        Ok(self.provider.get_object(key).await?)
    }
}

/// The last component of a client-supplied file name.
fn file_name_component(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_store::{FsProvider, InMemoryProvider};

    const MIB: usize = 1024 * 1024;

    fn memory_service() -> StorageService {
        StorageService::new(
            Arc::new(InMemoryProvider::new("http://localhost:3000")),
            SizeLimits::default(),
        )
    }

    fn upload(name: &str, content: &[u8], content_type: &str) -> AssetUpload {
        AssetUpload {
            name: name.into(),
            content: Bytes::copy_from_slice(content),
            content_type: content_type.into(),
        }
    }

    #[tokio::test]
    async fn save_then_get_is_byte_exact() {
        let svc = memory_service();
        let body = "# Plan\n\n- [ ] ship\n\u{1f33c}\n";
        let saved = svc.save_markdown("s1", "plan", body).await.unwrap();
        let read = svc.get_markdown("s1", "plan").await.unwrap();
        assert_eq!(read.markdown, body);
        assert_eq!(read.etag.as_deref(), Some(saved.etag.as_str()));
    }

    #[tokio::test]
    async fn never_written_returns_placeholder() {
        let svc = memory_service();
        let read = svc.get_markdown("s1", "nothing-here").await.unwrap();
        assert_eq!(read.markdown, DEFAULT_MARKDOWN);
        assert!(read.etag.is_none());
        assert!(read.version.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn same_content_same_etag() {
        let svc = memory_service();
        let a = svc.save_markdown("s1", "d", "# Same\n").await.unwrap();
        let b = svc.save_markdown("s1", "d", "# Same\n").await.unwrap();
        let c = svc.save_markdown("s1", "d", "# Different\n").await.unwrap();
        assert_eq!(a.etag, b.etag);
        assert_eq!(a.etag.len(), 16);
        assert_ne!(a.etag, c.etag);
        assert!(b.version.parse::<i64>().unwrap() >= a.version.parse::<i64>().unwrap());
    }

    #[tokio::test]
    async fn empty_markdown_rejected() {
        let svc = memory_service();
        assert!(matches!(
            svc.save_markdown("s1", "d", "").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn bad_segments_rejected() {
        let svc = memory_service();
        assert!(matches!(
            svc.get_markdown("s1", "..").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.save_markdown("", "d", "# x").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn conditional_save_checks_etag() {
        let svc = memory_service();
        let first = svc.save_markdown("s1", "d", "# v1\n").await.unwrap();

        let second = svc
            .save_markdown_if("s1", "d", "# v2\n", Some(&first.etag))
            .await
            .unwrap();

        let err = svc
            .save_markdown_if("s1", "d", "# v3\n", Some(&first.etag))
            .await
            .unwrap_err();
        match err {
            ServiceError::Conflict { expected, current } => {
                assert_eq!(expected, first.etag);
                assert_eq!(current, Some(second.etag));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(svc.get_markdown("s1", "d").await.unwrap().markdown, "# v2\n");
    }

    async fn racing_conditional_saves(svc: Arc<StorageService>) {
        let first = svc.save_markdown("s1", "d", "# v0\n").await.unwrap();

        let tasks: Vec<_> = (1..=32)
            .map(|i| {
                let svc = Arc::clone(&svc);
                let etag = first.etag.clone();
                tokio::spawn(async move {
                    let body = format!("# v{i}\n");
                    svc.save_markdown_if("s1", "d", &body, Some(&etag))
                        .await
                        .map(|_| body)
                })
            })
            .collect();

        let mut winners = Vec::new();
        for task in tasks {
            match task.await.unwrap() {
                Ok(body) => winners.push(body),
                Err(ServiceError::Conflict { .. }) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(svc.get_markdown("s1", "d").await.unwrap().markdown, winners[0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn one_conditional_save_wins_a_race_in_memory() {
        racing_conditional_saves(Arc::new(memory_service())).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn one_conditional_save_wins_a_race_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let svc = StorageService::new(
            Arc::new(FsProvider::new(dir.path(), "http://localhost:3000")),
            SizeLimits::default(),
        );
        racing_conditional_saves(Arc::new(svc)).await;
    }

    #[tokio::test]
    async fn conditional_save_on_missing_body_conflicts() {
        let svc = memory_service();
        let err = svc
            .save_markdown_if("s1", "new", "# x\n", Some("0000000000000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { current: None, .. }));
    }

    #[tokio::test]
    async fn upload_csv_asset() {
        let svc = memory_service();
        let bytes = b"Year,Value\n2020,100\n2021,150\n";
        let hash8 = ContentHasher::ASSET.hash(bytes);
        let r = svc
            .upload_asset("s1", "doc1", upload("chart.csv", bytes, "text/csv"))
            .await
            .unwrap();
        assert_eq!(r.rel_path, format!("./assets/chart-{hash8}.csv"));
        assert_eq!(r.hash, hash8);
        assert_eq!(r.media_type, "text/csv");
        assert_eq!(
            r.url,
            format!("http://localhost:3000/storage/spaces/s1/doc1/assets/chart-{hash8}.csv")
        );
    }

    #[tokio::test]
    async fn reupload_is_idempotent_overwrite() {
        let svc = memory_service();
        let a = svc.upload_asset("s1", "d", upload("a.png", b"px", "image/png")).await.unwrap();
        let b = svc.upload_asset("s1", "d", upload("a.png", b"px", "image/png")).await.unwrap();
        let c = svc.upload_asset("s1", "d", upload("b.png", b"px", "image/png")).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a.rel_path, c.rel_path);
        assert_eq!(svc.list_assets("s1", "d").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn upload_uses_last_path_component() {
        let svc = memory_service();
        let r = svc
            .upload_asset("s1", "d", upload("../../etc/img.png", b"x", "image/png"))
            .await
            .unwrap();
        assert!(r.rel_path.starts_with("./assets/img-"));
        assert!(matches!(
            svc.upload_asset("s1", "d", upload("dir/", b"x", "image/png")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn size_limit_depends_on_media_type() {
        let svc = memory_service();
        let big = vec![0u8; 11 * MIB];
        assert!(matches!(
            svc.upload_asset("s1", "d", upload("big.png", &big, "image/png")).await,
            Err(ServiceError::SizeLimitExceeded { .. })
        ));
        assert!(svc
            .upload_asset("s1", "d", upload("big.txt", &big, "text/plain"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn missing_content_type_defaults() {
        let svc = memory_service();
        let r = svc.upload_asset("s1", "d", upload("blob", b"?", "")).await.unwrap();
        assert_eq!(r.media_type, DEFAULT_MEDIA_TYPE);
        assert!(r.rel_path.ends_with('.'));
    }

    #[tokio::test]
    async fn list_assets_uses_placeholders() {
        let svc = memory_service();
        svc.upload_asset("s1", "d", upload("a.png", b"px", "image/png")).await.unwrap();
        svc.save_markdown("s1", "d", "# body\n").await.unwrap();

        let assets = svc.list_assets("s1", "d").await.unwrap();
        assert_eq!(assets.len(), 1);
        let a = &assets[0];
        assert_eq!(a.doc_id, "d");
        assert_eq!(a.size, 0);
        assert_eq!(a.hash, "");
        assert_eq!(a.media_type, DEFAULT_MEDIA_TYPE);
        assert!(a.rel_path.starts_with("./assets/a-"));
        assert!(svc.list_assets("s1", "other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filesystem_backend_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let svc = StorageService::new(
            Arc::new(FsProvider::new(dir.path(), "http://localhost:3000")),
            SizeLimits::default(),
        );
        svc.save_markdown("s1", "doc1", "# On disk\n").await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("spaces/s1/doc1/README.md")).unwrap(),
            "# On disk\n"
        );
        let r = svc
            .upload_asset("s1", "doc1", upload("chart.csv", b"a,b\n", "text/csv"))
            .await
            .unwrap();
        let listed = svc.list_assets("s1", "doc1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].rel_path, r.rel_path);
        assert_eq!(listed[0].url, r.url);

        let key = format!("spaces/s1/doc1/assets/chart-{}.csv", r.hash);
        let obj = svc.read_object(&key).await.unwrap().unwrap();
        assert_eq!(obj.content_type.as_deref(), Some("text/csv"));
    }

    #[test]
    fn markdown_body_wire_shape() {
        let body = MarkdownBody {
            markdown: DEFAULT_MARKDOWN.into(),
            version: "1".into(),
            etag: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["markdown"], DEFAULT_MARKDOWN);
        assert!(json.get("etag").is_none());
    }
}
