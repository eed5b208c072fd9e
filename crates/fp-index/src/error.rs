//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// No document with this id is indexed.
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// A name or title was empty.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The space id cannot be used as a directory name.
    #[error("invalid space id: {0}")]
    InvalidSpace(#[from] fp_types::TypeError),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
