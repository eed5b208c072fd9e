//! Key-value storage for Flowerpress.
//!
//! Markdown bodies and assets are stored under string keys in a flat,
//! `/`-separated namespace:
//!
//! ```text
//! spaces/{space}/{slug}/README.md
//! spaces/{space}/{slug}/assets/{base}-{hash8}.{ext}
//! ```
//!
//! Asset keys are content-addressed (see [`keys`]); the body key is fixed
//! and overwritten in place.
//!
//! # Storage Backends
//!
//! All backends implement the [`StorageProvider`] trait:
//!
//! - [`InMemoryProvider`] -- `HashMap`-backed, process lifetime only
//! - [`FsProvider`] -- directory tree with `.meta` content-type sidecars
//! - [`RemoteProvider`] -- object-store placeholder; every call is refused
//!
//! # Rules
//!
//! 1. Reading a missing key is `Ok(None)`, never an error.
//! 2. Uploads overwrite. There is no precondition check at this layer.
//! 3. Keys are validated before they touch a backend.

pub mod config;
pub mod error;
pub mod fs;
pub mod keys;
pub mod memory;
pub mod payload;
pub mod remote;
pub mod traits;

pub use config::{build_provider, BackendKind, StorageConfig};
pub use error::{StoreError, StoreResult};
pub use fs::FsProvider;
pub use memory::InMemoryProvider;
pub use payload::{Payload, StoredObject};
pub use remote::RemoteProvider;
pub use traits::StorageProvider;
