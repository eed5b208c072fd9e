//! Document index for Flowerpress.
//!
//! Document metadata (title, slug, version) is kept apart from Markdown
//! bodies. The [`DocumentIndex`] holds it in memory and is owned by whoever
//! constructs it; nothing here is global. The [`FilesystemReconciler`]
//! fills the index from bodies found on disk.
//!
//! Each `(space, slug)` pair moves from unknown to indexed exactly once.
//! Reconciliation is additive: it never overwrites an entry and never
//! removes one whose body has disappeared. Entries leave the index only
//! through [`DocumentIndex::remove`].

pub mod error;
pub mod index;
pub mod reconcile;

pub use error::{IndexError, IndexResult};
pub use index::{DocumentIndex, IndexStats};
pub use reconcile::{FilesystemReconciler, ReconcileReport};
