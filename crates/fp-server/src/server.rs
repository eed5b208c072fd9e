use std::sync::Arc;

use tokio::net::TcpListener;

use fp_index::DocumentIndex;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Flowerpress HTTP server.
pub struct FlowerpressServer {
    config: ServerConfig,
    state: AppState,
}

impl FlowerpressServer {
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let state = AppState::from_config(&config)?;
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The document index owned by this server.
    pub fn index(&self) -> Arc<DocumentIndex> {
        Arc::clone(&self.state.index)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Serve until ctrl-c, then shut the document index down.
    pub async fn serve(self) -> ServerResult<()> {
        let index = self.index();
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            backend = %self.config.storage.backend,
            "flowerpress server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        index.shutdown();
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c; shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_store::BackendKind;

    #[test]
    fn server_construction() {
        let mut config = ServerConfig::default();
        config.storage.backend = BackendKind::Memory;
        let server = FlowerpressServer::new(config).unwrap();
        assert_eq!(server.config().bind_addr.port(), 3000);
        assert!(server.index().is_empty());
        let _router = server.router();
    }

    #[test]
    fn misconfigured_remote_fails() {
        let mut config = ServerConfig::default();
        config.storage.backend = BackendKind::Remote;
        assert!(FlowerpressServer::new(config).is_err());
    }
}
