use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fp_service::SizeLimits;
use fp_store::StorageConfig;

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::base_url`].
pub const BASE_URL_ENV: &str = "FLOWERPRESS_BASE_URL";

/// Slack allowed on top of the largest upload for multipart framing.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Public origin used to build asset URLs.
    pub base_url: String,
    pub storage: StorageConfig,
    pub limits: SizeLimits,
    /// Scan the storage tree for unindexed documents when a space's
    /// document tree is requested (filesystem backend only).
    pub reconcile_on_read: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            base_url: "http://localhost:3000".into(),
            storage: StorageConfig::default(),
            limits: SizeLimits::default(),
            reconcile_on_read: true,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        self
    }

    /// Request body ceiling for the router.
    pub fn body_limit(&self) -> usize {
        body_limit_for(&self.limits)
    }
}

pub(crate) fn body_limit_for(limits: &SizeLimits) -> usize {
    usize::try_from(limits.largest() + MULTIPART_OVERHEAD).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_store::BackendKind;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.base_url, "http://localhost:3000");
        assert_eq!(c.storage.backend, BackendKind::Filesystem);
        assert!(c.reconcile_on_read);
        assert_eq!(c.body_limit(), 26 * 1024 * 1024);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"

            [storage]
            backend = "memory"

            [limits]
            max_image_bytes = 1024
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.storage.backend, BackendKind::Memory);
        assert_eq!(c.limits.max_image_bytes, 1024);
        assert_eq!(c.limits.max_asset_bytes, SizeLimits::default().max_asset_bytes);
        assert_eq!(c.base_url, "http://localhost:3000");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        assert!(matches!(
            ServerConfig::from_toml_str("bind_addr = 5"),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowerpress.toml");
        std::fs::write(&path, "base_url = \"https://docs.example.com\"\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.base_url, "https://docs.example.com");
        assert!(ServerConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
