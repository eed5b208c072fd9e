/// Errors from storage provider operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key cannot be mapped onto the backend namespace.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// I/O error from the underlying storage backend.
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A metadata sidecar could not be written.
    #[error("sidecar error on {key}: {reason}")]
    Sidecar { key: String, reason: String },

    /// The backend does not implement the operation.
    #[error("{backend} backend does not support {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    /// The backend configuration is incomplete.
    #[error("storage misconfigured: {0}")]
    Misconfigured(String),

    /// A blocking filesystem task failed to complete.
    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
