use std::sync::Arc;

use fp_index::{DocumentIndex, FilesystemReconciler};
use fp_service::StorageService;
use fp_store::{build_provider, BackendKind, InMemoryProvider};

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Shared handler state.
///
/// The index is constructed here and handed to every handler; shutting the
/// server down shuts the index down with it.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StorageService>,
    pub index: Arc<DocumentIndex>,
    /// Present when documents on disk should be merged into the index.
    pub reconciler: Option<FilesystemReconciler>,
}

impl AppState {
    pub fn new(
        service: Arc<StorageService>,
        index: Arc<DocumentIndex>,
        reconciler: Option<FilesystemReconciler>,
    ) -> Self {
        Self {
            service,
            index,
            reconciler,
        }
    }

    /// Build provider, service, index and reconciler from configuration.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let provider = build_provider(&config.storage, &config.base_url)?;
        let reconciler = (config.reconcile_on_read
            && config.storage.backend == BackendKind::Filesystem)
            .then(|| FilesystemReconciler::new(&config.storage.root));
        Ok(Self::new(
            Arc::new(StorageService::new(provider, config.limits)),
            Arc::new(DocumentIndex::new()),
            reconciler,
        ))
    }

    /// Memory-backed state with default limits.
    pub fn in_memory(base_url: &str) -> Self {
        Self::new(
            Arc::new(StorageService::new(
                Arc::new(InMemoryProvider::new(base_url)),
                Default::default(),
            )),
            Arc::new(DocumentIndex::new()),
            None,
        )
    }
}
