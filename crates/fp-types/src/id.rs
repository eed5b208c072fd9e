use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::temporal::now_millis;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Identifier for an index record: `<prefix>-<unix millis>-<base36 suffix>`.
///
/// Ids are unique for practical purposes (millisecond clock plus nine random
/// base36 characters) but carry no meaning beyond identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh document id (`doc-...`).
    pub fn document() -> Self {
        Self::generate("doc")
    }

    /// Generate a fresh folder id (`folder-...`).
    pub fn folder() -> Self {
        Self::generate("folder")
    }

    fn generate(prefix: &str) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{prefix}-{}-{suffix}", now_millis()))
    }

    /// Wrap an existing id string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_shape() {
        let id = RecordId::document();
        let parts: Vec<&str> = id.as_str().splitn(3, '-').collect();
        assert_eq!(parts[0], "doc");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    #[test]
    fn folder_id_prefix() {
        assert!(RecordId::folder().as_str().starts_with("folder-"));
    }

    #[test]
    fn ids_are_distinct() {
        let a = RecordId::document();
        let b = RecordId::document();
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = RecordId::from("doc-1-abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"doc-1-abc\"");
    }
}
