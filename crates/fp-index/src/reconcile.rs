//! Filesystem reconciliation.
//!
//! Scans `<root>/spaces/<space>/` for `<slug>/README.md` bodies and indexes
//! any slug that has no entry yet. Scans are additive and idempotent.
//! Slugs whose directories were removed stay indexed: detecting deletions
//! would need a full diff against the index, which is not done.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use fp_store::keys::MARKDOWN_FILE;
use fp_types::{validate_segment, Document};

use crate::error::IndexResult;
use crate::index::DocumentIndex;

/// Outcome of one scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Slug directories that contain a body.
    pub scanned: usize,
    /// Bodies newly added to the index.
    pub discovered: usize,
    /// Bodies whose slug was already indexed.
    pub already_indexed: usize,
    /// Entries that could not be read.
    pub skipped: usize,
}

/// Synthesizes index entries from Markdown bodies on disk.
#[derive(Clone, Debug)]
pub struct FilesystemReconciler {
    root: PathBuf,
}

impl FilesystemReconciler {
    /// `root` is the filesystem storage root (the directory holding
    /// `spaces/`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding a space's document directories.
    pub fn space_dir(&self, space_id: &str) -> PathBuf {
        self.root.join("spaces").join(space_id)
    }

    /// Scan one space and merge what is found into `index`.
    ///
    /// Unreadable directories and files are logged and skipped; a single
    /// bad document never fails the scan.
    pub async fn reconcile(
        &self,
        space_id: &str,
        index: &DocumentIndex,
    ) -> IndexResult<ReconcileReport> {
        validate_segment("space id", space_id)?;
        let dir = self.space_dir(space_id);
        let mut report = ReconcileReport::default();

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!(dir = %dir.display(), error = %e, "cannot create space directory");
            return Ok(report);
        }
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read space directory");
                return Ok(report);
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "directory listing interrupted");
                    report.skipped += 1;
                    break;
                }
            };
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "cannot stat entry");
                    report.skipped += 1;
                    continue;
                }
            }
            let Some(slug) = entry.file_name().to_str().map(str::to_string) else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 directory name");
                report.skipped += 1;
                continue;
            };
            if validate_segment("slug", &slug).is_err() {
                report.skipped += 1;
                continue;
            }

            let readme = entry.path().join(MARKDOWN_FILE);
            if !is_file(&readme).await {
                continue;
            }
            report.scanned += 1;

            if index.contains_slug(space_id, &slug) {
                report.already_indexed += 1;
                continue;
            }

            let markdown = match tokio::fs::read(&readme).await {
                Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
                Err(e) => {
                    warn!(path = %readme.display(), error = %e, "cannot read document body");
                    report.skipped += 1;
                    continue;
                }
            };

            let doc = Document::discovered(space_id, &slug, markdown);
            let id = doc.id.clone();
            if index.insert_if_absent(doc) {
                debug!(space = space_id, slug = %slug, id = %id, "indexed document from disk");
                report.discovered += 1;
            } else {
                report.already_indexed += 1;
            }
        }

        if report.discovered > 0 || report.skipped > 0 {
            info!(
                space = space_id,
                discovered = report.discovered,
                skipped = report.skipped,
                "reconciled space"
            );
        }
        Ok(report)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|md| md.is_file())
        .unwrap_or(false)
}
