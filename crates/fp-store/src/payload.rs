use bytes::Bytes;

/// Content held under a storage key.
///
/// Markdown bodies travel as text; assets as raw bytes. The filesystem
/// backend decodes `.md` keys as text on read and everything else as bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Bytes),
}

impl Payload {
    /// The raw bytes of the payload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Text(s) => Bytes::from(s),
            Self::Binary(b) => b,
        }
    }

    /// The payload as text, replacing invalid UTF-8 sequences.
    pub fn into_text_lossy(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Binary(b) => String::from_utf8_lossy(&b).into_owned(),
        }
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(v))
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Self::Binary(b)
    }
}

/// A payload together with the content type recorded at upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub payload: Payload,
    pub content_type: Option<String>,
}

impl StoredObject {
    pub fn new(payload: Payload, content_type: Option<&str>) -> Self {
        Self {
            payload,
            content_type: content_type.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_binary_views() {
        let t = Payload::from("# hi\n");
        assert_eq!(t.as_bytes(), b"# hi\n");
        assert_eq!(t.len(), 5);

        let b = Payload::from(vec![0xff, 0x00]);
        assert_eq!(b.len(), 2);
        assert_eq!(b.clone().into_bytes().as_ref(), &[0xff, 0x00]);
        assert_eq!(b.into_text_lossy(), "\u{fffd}\u{0}");
    }

    #[test]
    fn empty_payload() {
        assert!(Payload::from(String::new()).is_empty());
        assert!(Payload::from(Bytes::new()).is_empty());
    }
}
