//! Local storage for uploaded documents
//!
//! Uploads are written under `<root>/documents/` with a unique prefix so that
//! two uploads with the same client filename never collide. The returned path
//! is relative to the root and is what gets persisted on the content record.

use crate::errors::{AppError, Result};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Subdirectory that holds uploaded documents
pub const DOCUMENTS_DIR: &str = "documents";

/// Filesystem-backed upload store
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist an upload and return its root-relative path
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let dir = self.root.join(DOCUMENTS_DIR);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| AppError::Storage {
            message: format!("Failed to create {}: {}", dir.display(), e),
        })?;

        let stored_name = format!("{}_{}", Uuid::new_v4().simple(), safe_name(filename));
        let path = dir.join(&stored_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| AppError::Storage {
            message: format!("Failed to write {}: {}", path.display(), e),
        })?;

        debug!(path = %path.display(), size = bytes.len(), "Stored upload");
        Ok(format!("{}/{}", DOCUMENTS_DIR, stored_name))
    }
}

/// Reduce a client-supplied filename to a safe basename
fn safe_name(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("report.pdf"), "report.pdf");
        assert_eq!(safe_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_name("C:\\docs\\my file.docx"), "my_file.docx");
        assert_eq!(safe_name(".."), "upload");
        assert_eq!(safe_name(""), "upload");
    }

    #[tokio::test]
    async fn test_save_writes_under_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        let first = store.save("notes.txt", b"hello").await.unwrap();
        let second = store.save("notes.txt", b"world").await.unwrap();

        assert!(first.starts_with("documents/"));
        assert!(first.ends_with("_notes.txt"));
        assert_ne!(first, second);

        assert_eq!(std::fs::read(dir.path().join(&first)).unwrap(), b"hello");
        assert_eq!(std::fs::read(dir.path().join(&second)).unwrap(), b"world");
    }

    #[test]
    fn test_unwritable_root_is_storage_error() {
        // A regular file cannot hold the documents directory
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = LocalFileStore::new(file.path());
        let err = tokio_test::block_on(store.save("a.txt", b"x")).unwrap_err();
        assert!(matches!(err, AppError::Storage { .. }));
    }
}
