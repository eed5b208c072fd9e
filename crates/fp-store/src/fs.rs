use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::BackendKind;
use crate::error::{StoreError, StoreResult};
use crate::keys::{public_url, validate_key};
use crate::payload::{Payload, StoredObject};
use crate::traits::StorageProvider;

/// Suffix of the content-type sidecar written next to every content file.
pub const META_SUFFIX: &str = ".meta";

/// Suffix of in-flight content files, written as
/// `<file>.<8 hex nonce>.fp-partial` and renamed into place once complete.
const PARTIAL_SUFFIX: &str = ".fp-partial";

/// Sidecar contents: `{"contentType": "..."}`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

/// Filesystem-backed provider.
///
/// Key `a/b/c` maps to `<root>/a/b/c`, with its content type recorded in
/// `<root>/a/b/c.meta`. Content is written to a temporary sibling and
/// renamed into place, so readers never observe a torn file. The sidecar is
/// written afterwards; if that write fails the content stays, and reads
/// report no content type for it.
#[derive(Debug, Clone)]
pub struct FsProvider {
    root: PathBuf,
    base_url: String,
}

impl FsProvider {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn partial_path(path: &Path) -> PathBuf {
    let nonce: u32 = rand::thread_rng().gen();
    sibling_with_suffix(path, &format!(".{nonce:08x}{PARTIAL_SUFFIX}"))
}

/// Only the nonce-bearing form counts, so a user file that merely ends in
/// `.fp-partial` stays visible.
fn is_partial(name: &str) -> bool {
    name.strip_suffix(PARTIAL_SUFFIX)
        .and_then(|rest| rest.rsplit_once('.'))
        .is_some_and(|(_, nonce)| nonce.len() == 8 && nonce.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Sidecars and in-flight files: present on disk but never keys.
fn is_hidden_artifact(name: &str) -> bool {
    name.ends_with(META_SUFFIX) || is_partial(name)
}

async fn remove_if_present(key: &str, path: &Path) -> StoreResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(key, e)),
    }
}

async fn read_meta(key: &str, path: &Path) -> Option<ObjectMeta> {
    let raw = tokio::fs::read(sibling_with_suffix(path, META_SUFFIX)).await.ok()?;
    match serde_json::from_slice(&raw) {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed sidecar");
            None
        }
    }
}

#[async_trait]
impl StorageProvider for FsProvider {
    fn kind(&self) -> BackendKind {
        BackendKind::Filesystem
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
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(key, e))?;
        }

        let partial = partial_path(&path);
        if let Err(e) = tokio::fs::write(&partial, payload.as_bytes()).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StoreError::io(key, e));
        }
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StoreError::io(key, e));
        }

        let meta = ObjectMeta {
            content_type: content_type.map(str::to_string),
        };
        let meta_bytes = serde_json::to_vec(&meta).map_err(|e| StoreError::Sidecar {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(sibling_with_suffix(&path, META_SUFFIX), meta_bytes)
            .await
            .map_err(|e| StoreError::Sidecar {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        debug!(key, bytes = payload.len(), "fs upload");
        Ok(self.url_for(key))
    }

    async fn get_object(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        let path = self.resolve(key)?;
        if is_hidden_artifact(key) {
            return Ok(None);
        }
        match tokio::fs::metadata(&path).await {
            Ok(md) if md.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(key, e)),
        }

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(key, e)),
        };
        let payload = if key.ends_with(".md") {
            Payload::Text(String::from_utf8_lossy(&raw).into_owned())
        } else {
            Payload::from(raw)
        };
        let content_type = read_meta(key, &path).await.and_then(|m| m.content_type);
        Ok(Some(StoredObject {
            payload,
            content_type,
        }))
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let trimmed = prefix.trim_end_matches('/');
        let dir = if trimmed.is_empty() {
            self.root.clone()
        } else {
            self.resolve(trimmed)?
        };
        let root = self.root.clone();
        let prefix = prefix.to_string();

        tokio::task::spawn_blocking(move || {
            if !dir.is_dir() {
                return Vec::new();
            }
            let mut keys = Vec::new();
            for entry in WalkDir::new(&dir).follow_links(false) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(prefix = %prefix, error = %e, "skipping unreadable entry");
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(rel) = entry.path().strip_prefix(&root) else {
                    continue;
                };
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if is_hidden_artifact(&key) {
                    continue;
                }
                keys.push(key);
            }
            keys.sort();
            keys
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.resolve(key)?;
        remove_if_present(key, &path).await?;
        remove_if_present(key, &sibling_with_suffix(&path, META_SUFFIX)).await?;
        debug!(key, "fs delete");
        Ok(())
    }
}
