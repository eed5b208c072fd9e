use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::slug::slugify;
use crate::temporal::now;

/// Title given to documents created without one.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// Metadata record for a Markdown document.
///
/// The body lives in storage under the document's slug. `markdown` here is a
/// snapshot taken when the record was created (or discovered on disk); it is
/// not kept in sync with later saves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: RecordId,
    pub space_id: String,
    pub slug: String,
    pub title: String,
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// A new document as created through the editor.
    ///
    /// The slug comes from the title, or from the generated id when no
    /// title is given. The initial body is a level-one heading.
    pub fn create(space_id: &str, title: Option<&str>, folder_id: Option<RecordId>) -> Self {
        let id = RecordId::document();
        let title = title.filter(|t| !t.is_empty());
        let slug = title
            .and_then(slugify)
            .unwrap_or_else(|| id.as_str().to_string());
        let title = title.unwrap_or(DEFAULT_TITLE).to_string();
        let markdown = format!("# {title}\n\n");
        let ts = now();
        Self {
            id,
            space_id: space_id.to_string(),
            slug,
            title,
            markdown,
            folder_id,
            version: None,
            etag: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    /// A document synthesized from a body found on disk under `slug`.
    pub fn discovered(space_id: &str, slug: &str, markdown: String) -> Self {
        let title = title_from_markdown(&markdown).unwrap_or_else(|| slug.to_string());
        let ts = now();
        Self {
            id: RecordId::document(),
            space_id: space_id.to_string(),
            slug: slug.to_string(),
            title,
            markdown,
            folder_id: None,
            version: None,
            etag: None,
            created_at: ts,
            updated_at: ts,
        }
    }
}

/// First line of the body with a leading `#` and following whitespace
/// removed. `None` when that leaves nothing.
fn title_from_markdown(markdown: &str) -> Option<String> {
    let first = markdown.split('\n').next().unwrap_or_default();
    let title = match first.strip_prefix('#') {
        Some(rest) => rest.trim_start(),
        None => first,
    };
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Hierarchical grouping of documents within a space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
    pub space_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(space_id: &str, name: impl Into<String>, parent_id: Option<RecordId>) -> Self {
        let ts = now();
        Self {
            id: RecordId::folder(),
            name: name.into(),
            parent_id,
            space_id: space_id.to_string(),
            created_at: ts,
            updated_at: ts,
        }
    }
}
