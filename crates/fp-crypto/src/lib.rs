//! Content fingerprints for Flowerpress.
//!
//! All fingerprints are prefixes of the lowercase hex SHA-256 digest of the
//! content. They are short on purpose: an 8-character asset hash keeps file
//! names readable and is collision-tolerant, not a dedup guarantee.

pub mod hasher;

pub use hasher::{sha256_hex, ContentHasher};
