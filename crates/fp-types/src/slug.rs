//! Slugs and storage key segments.

use crate::error::TypeError;

/// Derive the addressing slug for a document title.
///
/// The title is lower-cased and every maximal run of characters outside
/// `[a-z0-9]` becomes a single `-`. Leading and trailing dashes are kept, so
/// `"Hello, World!"` becomes `"hello-world-"`. Returns `None` for an empty
/// title; callers fall back to the document id.
pub fn slugify(title: &str) -> Option<String> {
    if title.is_empty() {
        return None;
    }
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_gap = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    Some(slug)
}

/// Check that `value` can be used as a single storage key segment
/// (a space id or a document slug).
pub fn validate_segment(kind: &'static str, value: &str) -> Result<(), TypeError> {
    if value.is_empty() {
        return Err(TypeError::EmptySegment { kind });
    }
    let reason = if value == "." || value == ".." {
        Some("relative path component")
    } else if value.contains('/') || value.contains('\\') {
        Some("contains a path separator")
    } else if value.chars().any(char::is_control) {
        Some("contains a control character")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(TypeError::InvalidSegment {
            kind,
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
