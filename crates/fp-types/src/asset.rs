use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attachment stored next to a document.
///
/// `rel_path` is what gets embedded in the Markdown body
/// (`./assets/<base>-<hash8>.<ext>`); `url` is the absolute fetch location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub space_id: String,
    pub doc_id: String,
    pub rel_path: String,
    pub url: String,
    pub media_type: String,
    pub size: u64,
    pub hash: String,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful asset upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub url: String,
    pub rel_path: String,
    pub media_type: String,
    pub hash: String,
}
