//! Storage service for Flowerpress.
//!
//! [`StorageService`] turns key derivation and a [`fp_store::StorageProvider`]
//! into the four operations the editor consumes: save and read a Markdown
//! body, upload and list assets.
//!
//! Absence is never an error here. A body that was never written reads as
//! [`DEFAULT_MARKDOWN`]. Errors are reserved for malformed input, size
//! limits, etag preconditions and backend I/O failures.

pub mod error;
pub mod limits;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use limits::SizeLimits;
pub use service::{
    AssetUpload, MarkdownBody, SaveReceipt, StorageService, DEFAULT_MARKDOWN,
    DEFAULT_MEDIA_TYPE, MARKDOWN_CONTENT_TYPE,
};
