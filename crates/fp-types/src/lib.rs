//! Foundation types for Flowerpress.
//!
//! Every other Flowerpress crate depends on `fp-types`. The types here are
//! plain data: they know how to serialize themselves in the camelCase shape
//! the editor expects, but they never touch storage.
//!
//! # Key Types
//!
//! - [`Document`]: metadata record for a Markdown document in a space
//! - [`Folder`]: hierarchical grouping of documents
//! - [`Asset`]: attachment referenced from a document body
//! - [`RecordId`]: `doc-<millis>-<suffix>` style identifiers
//! - [`slugify`]: title to URL-safe addressing key

pub mod asset;
pub mod document;
pub mod error;
pub mod id;
pub mod slug;
pub mod temporal;

pub use asset::{Asset, UploadReceipt};
pub use document::{Document, Folder, DEFAULT_TITLE};
pub use error::TypeError;
pub use id::RecordId;
pub use slug::{slugify, validate_segment};
pub use temporal::{now, now_millis, version_token};
