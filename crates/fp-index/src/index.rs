//! The in-memory document index.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use tracing::{debug, info};

use fp_types::{now, Document, Folder, RecordId};

use crate::error::{IndexError, IndexResult};

/// Counts reported when an index is shut down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub folders: usize,
}

/// Document and folder metadata, keyed by id.
///
/// Each map sits behind its own `RwLock`. Guards are never held across an
/// await point; concurrent updates to one entry are last-writer-wins.
#[derive(Default)]
pub struct DocumentIndex {
    documents: RwLock<HashMap<RecordId, Document>>,
    folders: RwLock<HashMap<RecordId, Folder>>,
}

impl std::fmt::Debug for DocumentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("DocumentIndex")
            .field("documents", &stats.documents)
            .field("folders", &stats.folders)
            .finish()
    }
}

impl DocumentIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.documents.read().expect("lock poisoned").len(),
            folders: self.folders.read().expect("lock poisoned").len(),
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and report what was held.
    pub fn shutdown(&self) -> IndexStats {
        let stats = self.stats();
        self.documents.write().expect("lock poisoned").clear();
        self.folders.write().expect("lock poisoned").clear();
        info!(documents = stats.documents, folders = stats.folders, "document index shut down");
        stats
    }

    // ---------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------

    /// Create and index a new document. The caller is responsible for
    /// writing its initial body to storage.
    pub fn create_document(
        &self,
        space_id: &str,
        title: Option<&str>,
        folder_id: Option<RecordId>,
    ) -> IndexResult<Document> {
        fp_types::validate_segment("space id", space_id)?;
        let doc = Document::create(space_id, title, folder_id);
        self.insert(doc.clone());
        debug!(id = %doc.id, slug = %doc.slug, "document created");
        Ok(doc)
    }

    /// Insert or replace a document by id. Returns the replaced entry.
    pub fn insert(&self, doc: Document) -> Option<Document> {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(doc.id.clone(), doc)
    }

    /// Insert `doc` unless an entry with the same `(space, slug)` exists.
    ///
    /// The check and the insert happen under one write lock, so two
    /// concurrent sightings of the same slug index it once.
    pub fn insert_if_absent(&self, doc: Document) -> bool {
        let mut docs = self.documents.write().expect("lock poisoned");
        let taken = docs
            .values()
            .any(|d| d.space_id == doc.space_id && d.slug == doc.slug);
        if taken {
            return false;
        }
        docs.insert(doc.id.clone(), doc);
        true
    }

    pub fn get(&self, id: &RecordId) -> Option<Document> {
        self.documents.read().expect("lock poisoned").get(id).cloned()
    }

    /// First document (oldest) addressed by `slug` in `space_id`.
    pub fn find_by_slug(&self, space_id: &str, slug: &str) -> Option<Document> {
        let docs = self.documents.read().expect("lock poisoned");
        docs.values()
            .filter(|d| d.space_id == space_id && d.slug == slug)
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned()
    }

    pub fn contains_slug(&self, space_id: &str, slug: &str) -> bool {
        let docs = self.documents.read().expect("lock poisoned");
        docs.values().any(|d| d.space_id == space_id && d.slug == slug)
    }

    /// All documents in a space, oldest first.
    pub fn documents_in_space(&self, space_id: &str) -> Vec<Document> {
        let docs = self.documents.read().expect("lock poisoned");
        let mut out: Vec<Document> = docs
            .values()
            .filter(|d| d.space_id == space_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Change a document's title. The slug is left alone so stored bodies
    /// stay addressable.
    pub fn rename(&self, id: &RecordId, title: &str) -> IndexResult<Document> {
        if title.is_empty() {
            return Err(IndexError::InvalidName("title must not be empty".into()));
        }
        let mut docs = self.documents.write().expect("lock poisoned");
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| IndexError::DocumentNotFound(id.to_string()))?;
        doc.title = title.to_string();
        doc.updated_at = now();
        Ok(doc.clone())
    }

    /// Remove a document from the index. Its body stays in storage, so a
    /// later reconciliation may index it again under a new id.
    pub fn remove(&self, id: &RecordId) -> Option<Document> {
        self.documents.write().expect("lock poisoned").remove(id)
    }

    /// Stamp every document addressed by `(space, slug)` with the result of
    /// a body save. Returns how many entries were updated.
    pub fn record_save(&self, space_id: &str, slug: &str, version: &str, etag: &str) -> usize {
        let mut docs = self.documents.write().expect("lock poisoned");
        let ts = now();
        let mut updated = 0;
        for doc in docs
            .values_mut()
            .filter(|d| d.space_id == space_id && d.slug == slug)
        {
            doc.version = Some(version.to_string());
            doc.etag = Some(etag.to_string());
            doc.updated_at = ts;
            updated += 1;
        }
        updated
    }

    // ---------------------------------------------------------------
    // Folders
    // ---------------------------------------------------------------

    pub fn create_folder(
        &self,
        space_id: &str,
        name: &str,
        parent_id: Option<RecordId>,
    ) -> IndexResult<Folder> {
        fp_types::validate_segment("space id", space_id)?;
        if name.is_empty() {
            return Err(IndexError::InvalidName("folder name must not be empty".into()));
        }
        let folder = Folder::new(space_id, name, parent_id);
        self.folders
            .write()
            .expect("lock poisoned")
            .insert(folder.id.clone(), folder.clone());
        Ok(folder)
    }

    /// All folders in a space, oldest first.
    pub fn folders_in_space(&self, space_id: &str) -> Vec<Folder> {
        let folders = self.folders.read().expect("lock poisoned");
        let mut out: Vec<Folder> = folders
            .values()
            .filter(|f| f.space_id == space_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_get() {
        let idx = DocumentIndex::new();
        let doc = idx.create_document("s1", Some("Plan"), None).unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get(&doc.id), Some(doc.clone()));
        assert_eq!(idx.find_by_slug("s1", "plan"), Some(doc));
        assert!(idx.find_by_slug("s2", "plan").is_none());
    }

    #[test]
    fn create_rejects_bad_space() {
        let idx = DocumentIndex::new();
        assert!(matches!(
            idx.create_document("a/b", None, None),
            Err(IndexError::InvalidSpace(_))
        ));
    }

    #[test]
    fn slugs_may_collide_on_create() {
        let idx = DocumentIndex::new();
        let a = idx.create_document("s1", Some("Notes"), None).unwrap();
        let b = idx.create_document("s1", Some("notes!"), None).unwrap();
        assert_eq!(a.slug, "notes");
        assert_eq!(b.slug, "notes-");
        let c = idx.create_document("s1", Some("NOTES"), None).unwrap();
        assert_eq!(c.slug, a.slug);
        assert_eq!(idx.documents_in_space("s1").len(), 3);
    }

    #[test]
    fn insert_if_absent_first_sighting_wins() {
        let idx = DocumentIndex::new();
        let first = Document::discovered("s1", "notes", "# One".into());
        let second = Document::discovered("s1", "notes", "# Two".into());
        assert!(idx.insert_if_absent(first.clone()));
        assert!(!idx.insert_if_absent(second));
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.find_by_slug("s1", "notes").unwrap().id, first.id);
        assert!(idx.insert_if_absent(Document::discovered("s2", "notes", "# x".into())));
    }

    #[test]
    fn documents_scoped_to_space() {
        let idx = DocumentIndex::new();
        idx.create_document("s1", Some("A"), None).unwrap();
        idx.create_document("s1", Some("B"), None).unwrap();
        idx.create_document("s2", Some("C"), None).unwrap();
        let s1 = idx.documents_in_space("s1");
        assert_eq!(s1.len(), 2);
        assert!(s1.iter().all(|d| d.space_id == "s1"));
        assert!(idx.documents_in_space("s3").is_empty());
    }

    #[test]
    fn rename_updates_title_only() {
        let idx = DocumentIndex::new();
        let doc = idx.create_document("s1", Some("Old"), None).unwrap();
        let renamed = idx.rename(&doc.id, "New Title").unwrap();
        assert_eq!(renamed.title, "New Title");
        assert_eq!(renamed.slug, "old");
        assert!(renamed.updated_at >= doc.updated_at);
        assert!(matches!(
            idx.rename(&RecordId::from("doc-missing"), "x"),
            Err(IndexError::DocumentNotFound(_))
        ));
        assert!(matches!(idx.rename(&doc.id, ""), Err(IndexError::InvalidName(_))));
    }

    #[test]
    fn remove_only_touches_index() {
        let idx = DocumentIndex::new();
        let doc = idx.create_document("s1", Some("Gone"), None).unwrap();
        assert_eq!(idx.remove(&doc.id).map(|d| d.id), Some(doc.id.clone()));
        assert!(idx.remove(&doc.id).is_none());
        assert!(idx.is_empty());
    }

    #[test]
    fn record_save_stamps_matching_docs() {
        let idx = DocumentIndex::new();
        idx.create_document("s1", Some("Plan"), None).unwrap();
        idx.create_document("s1", Some("Other"), None).unwrap();
        assert_eq!(idx.record_save("s1", "plan", "1700000000000", "abcdef0123456789"), 1);
        let doc = idx.find_by_slug("s1", "plan").unwrap();
        assert_eq!(doc.version.as_deref(), Some("1700000000000"));
        assert_eq!(doc.etag.as_deref(), Some("abcdef0123456789"));
        assert!(idx.find_by_slug("s1", "other").unwrap().etag.is_none());
        assert_eq!(idx.record_save("s1", "missing", "1", "e"), 0);
    }

    #[test]
    fn folders() {
        let idx = DocumentIndex::new();
        let root = idx.create_folder("s1", "Projects", None).unwrap();
        let child = idx.create_folder("s1", "2024", Some(root.id.clone())).unwrap();
        assert_eq!(child.parent_id, Some(root.id));
        idx.create_folder("s2", "Elsewhere", None).unwrap();
        assert_eq!(idx.folders_in_space("s1").len(), 2);
        assert!(matches!(idx.create_folder("s1", "", None), Err(IndexError::InvalidName(_))));
    }

    #[test]
    fn shutdown_clears() {
        let idx = DocumentIndex::new();
        idx.create_document("s1", Some("A"), None).unwrap();
        idx.create_folder("s1", "F", None).unwrap();
        let stats = idx.shutdown();
        assert_eq!(stats, IndexStats { documents: 1, folders: 1 });
        assert!(idx.is_empty());
        assert_eq!(idx.stats(), IndexStats::default());
    }
}
