use fp_store::StoreError;
use fp_types::TypeError;

/// Errors from storage service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A required field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An upload is larger than its media type allows.
    #[error("{media_type} upload of {size} bytes exceeds the {limit} byte limit")]
    SizeLimitExceeded {
        media_type: String,
        size: u64,
        limit: u64,
    },

    /// A conditional save found a different body than the caller expected.
    #[error("etag mismatch: expected {expected}, current {}", current.as_deref().unwrap_or("<none>"))]
    Conflict {
        expected: String,
        current: Option<String>,
    },

    /// Backend failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<TypeError> for ServiceError {
    fn from(e: TypeError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
