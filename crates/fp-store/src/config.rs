use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::fs::FsProvider;
use crate::memory::InMemoryProvider;
use crate::remote::RemoteProvider;
use crate::traits::StorageProvider;

/// Storage backend variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    #[default]
    Filesystem,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Filesystem => write!(f, "filesystem"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Storage section of the server configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Root directory for the filesystem backend.
    pub root: PathBuf,
    /// Object-store endpoint for the remote backend.
    pub endpoint: Option<String>,
    /// Bucket name for the remote backend.
    pub bucket: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Filesystem,
            root: PathBuf::from(".flowerpress-storage"),
            endpoint: None,
            bucket: None,
        }
    }
}

/// Construct the provider selected by `config`.
pub fn build_provider(
    config: &StorageConfig,
    base_url: &str,
) -> StoreResult<Arc<dyn StorageProvider>> {
    let provider: Arc<dyn StorageProvider> = match config.backend {
        BackendKind::Memory => Arc::new(InMemoryProvider::new(base_url)),
        BackendKind::Filesystem => Arc::new(FsProvider::new(&config.root, base_url)),
        BackendKind::Remote => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                StoreError::Misconfigured("remote backend requires `endpoint`".into())
            })?;
            let bucket = config.bucket.as_deref().ok_or_else(|| {
                StoreError::Misconfigured("remote backend requires `bucket`".into())
            })?;
            Arc::new(RemoteProvider::new(endpoint, bucket))
        }
    };
    tracing::info!(backend = %config.backend, "storage provider ready");
    Ok(provider)
}
