use sha2::{Digest, Sha256};

/// Truncated SHA-256 hasher.
///
/// Each hasher carries the number of hex characters it keeps. The asset
/// hasher keeps 8 (embedded in asset keys), the etag hasher keeps 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    hex_len: usize,
}

impl ContentHasher {
    /// Hasher for asset keys (`hash8`).
    pub const ASSET: Self = Self { hex_len: 8 };
    /// Hasher for Markdown body etags.
    pub const ETAG: Self = Self { hex_len: 16 };

    /// Create a hasher keeping `hex_len` hex characters (at most 64).
    pub const fn new(hex_len: usize) -> Self {
        let hex_len = if hex_len > 64 { 64 } else { hex_len };
        Self { hex_len }
    }

    /// Truncated hex fingerprint of `data`.
    pub fn hash(&self, data: &[u8]) -> String {
        let mut full = sha256_hex(data);
        full.truncate(self.hex_len);
        full
    }

    /// Check that `data` produces the `expected` fingerprint.
    pub fn verify(&self, data: &[u8], expected: &str) -> bool {
        self.hash(data) == expected
    }

    /// Number of hex characters this hasher keeps.
    pub fn hex_len(&self) -> usize {
        self.hex_len
    }
}

/// Full lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(ContentHasher::ASSET.hash(b"abc"), "ba7816bf");
        assert_eq!(ContentHasher::ETAG.hash(b"abc"), "ba7816bf8f01cfea");
    }

    #[test]
    fn empty_input() {
        assert_eq!(ContentHasher::ASSET.hash(b""), "e3b0c442");
    }

    #[test]
    fn verify_roundtrip() {
        let h = ContentHasher::ETAG;
        let tag = h.hash(b"# Title\n");
        assert!(h.verify(b"# Title\n", &tag));
        assert!(!h.verify(b"# Other\n", &tag));
    }

    #[test]
    fn new_clamps_length() {
        assert_eq!(ContentHasher::new(100).hex_len(), 64);
        assert_eq!(ContentHasher::new(100).hash(b"x").len(), 64);
    }

    proptest! {
        #[test]
        fn etag_extends_asset_hash(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let short = ContentHasher::ASSET.hash(&data);
            let long = ContentHasher::ETAG.hash(&data);
            prop_assert_eq!(short.len(), 8);
            prop_assert!(long.starts_with(&short));
        }
    }
}
