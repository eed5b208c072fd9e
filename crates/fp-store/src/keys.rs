//! Storage key derivation.
//!
//! Every function here is pure. Asset keys depend only on the space, the
//! document slug, the original filename and the content bytes, so
//! re-uploading the same bytes under the same name lands on the same key.
//! Identical bytes under different names get different keys.

use fp_crypto::ContentHasher;

use crate::error::{StoreError, StoreResult};

/// File name of a document body inside its slug directory.
pub const MARKDOWN_FILE: &str = "README.md";

/// Directory holding a document's assets.
pub const ASSETS_DIR: &str = "assets";

/// Route segment under which stored objects are fetched.
pub const STORAGE_ROUTE: &str = "storage";

/// `spaces/{space}/`
pub fn space_prefix(space_id: &str) -> String {
    format!("spaces/{space_id}/")
}

/// `spaces/{space}/{slug}/README.md`
pub fn markdown_key(space_id: &str, doc_slug: &str) -> String {
    format!("spaces/{space_id}/{doc_slug}/{MARKDOWN_FILE}")
}

/// `spaces/{space}/{slug}/assets/`
pub fn asset_prefix(space_id: &str, doc_slug: &str) -> String {
    format!("spaces/{space_id}/{doc_slug}/{ASSETS_DIR}/")
}

/// Split a filename into `(base, ext)`.
///
/// `ext` is everything after the last `.`, empty when there is no dot.
/// `base` drops the final extension only when that extension is non-empty.
pub fn split_filename(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos + 1 < filename.len() => (&filename[..pos], &filename[pos + 1..]),
        Some(_) => (filename, ""),
        None => (filename, ""),
    }
}

/// Derive the content-addressed key for an asset.
///
/// `spaces/{space}/{slug}/assets/{base}-{hash8}.{ext}`. A filename without
/// an extension yields a key ending in `.`.
pub fn asset_key(space_id: &str, doc_slug: &str, filename: &str, content: &[u8]) -> String {
    let hash8 = ContentHasher::ASSET.hash(content);
    asset_key_with_hash(space_id, doc_slug, filename, &hash8)
}

/// Same as [`asset_key`] for a precomputed `hash8`.
pub fn asset_key_with_hash(space_id: &str, doc_slug: &str, filename: &str, hash8: &str) -> String {
    let (base, ext) = split_filename(filename);
    format!(
        "{}{base}-{hash8}.{ext}",
        asset_prefix(space_id, doc_slug)
    )
}

/// Document-relative reference for a key: `./assets/<last segment>`.
pub fn rel_path(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    format!("./{ASSETS_DIR}/{name}")
}

/// Absolute fetch URL for a key served by the storage route.
pub fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{STORAGE_ROUTE}/{key}", base_url.trim_end_matches('/'))
}

/// Reject keys that could escape the storage namespace.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let reason = if key.is_empty() {
        Some("empty key")
    } else if key.starts_with('/') {
        Some("absolute key")
    } else if key.contains('\\') {
        Some("backslash in key")
    } else if key.contains('\0') {
        Some("NUL byte in key")
    } else if key
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        Some("empty or relative segment")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
