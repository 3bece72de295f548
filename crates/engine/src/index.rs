use crate::error::{ErrorKind, Result};
use casemover_storage::{FolderEntry, normalize_path, probe, walk};
use exn::ResultExt;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tracing::instrument;

const PROGRESS_EVERY: usize = 10_000;

/// Flat list of every directory below a source root, in scan order.
#[derive(Debug, Clone)]
pub struct FolderIndex {
    root: PathBuf,
    entries: Vec<FolderEntry>,
    skipped: usize,
}
impl FolderIndex {
    /// Scans `root` once. Unreadable subtrees are logged and skipped; only a
    /// missing or unlistable root is an error.
    ///
    /// `cap` keeps the first N entries in scan order and is meant for
    /// diagnostics.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub async fn build(root: &Path, cap: Option<usize>) -> Result<Self> {
        let root = normalize_path(root).or_raise(|| ErrorKind::SourceRoot(root.to_path_buf()))?;
        if !probe::is_readable_directory(&root).await {
            exn::bail!(ErrorKind::SourceRoot(root));
        }
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        let mut walker = Box::pin(walk(root.clone()));
        while let Some(item) = walker.next().await {
            match item {
                Ok(entry) => {
                    entries.push(entry);
                    if entries.len() % PROGRESS_EVERY == 0 {
                        tracing::info!(folders = entries.len(), "Scanning...");
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %*e, "Skipping unreadable directory");
                    skipped += 1;
                },
            }
            if cap.is_some_and(|cap| entries.len() >= cap) {
                tracing::info!(cap = entries.len(), "Scan capped");
                break;
            }
        }
        tracing::info!(folders = entries.len(), skipped, "Scan complete");
        Ok(Self { root, entries, skipped })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[FolderEntry] {
        &self.entries
    }

    /// Directories that could not be listed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        for dir in ["2023/Case_00123_2023", "2024/Case_00123_2024", "Case_00456", "Case_00456/Case_00789"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        fs::write(temp.path().join("Case_99999.txt"), b"a file, not a folder").unwrap();
        temp
    }

    fn names(index: &FolderIndex) -> Vec<&str> {
        index.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_build_flattens_every_depth() {
        let temp = tree();
        let index = FolderIndex::build(temp.path(), None).await.unwrap();
        assert_eq!(
            names(&index),
            vec!["2023", "Case_00123_2023", "2024", "Case_00123_2024", "Case_00456", "Case_00789"]
        );
        assert_eq!(index.skipped(), 0);
        assert_eq!(index.root(), normalize_path(temp.path()).unwrap());
    }

    #[tokio::test]
    async fn test_cap_truncates_in_scan_order() {
        let temp = tree();
        let index = FolderIndex::build(temp.path(), Some(3)).await.unwrap();
        assert_eq!(names(&index), vec!["2023", "Case_00123_2023", "2024"]);
    }

    #[tokio::test]
    async fn test_missing_root_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let err = FolderIndex::build(&temp.path().join("missing"), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SourceRoot(_)));
    }

    #[tokio::test]
    async fn test_file_root_is_fatal() {
        let temp = tree();
        let err = FolderIndex::build(&temp.path().join("Case_99999.txt"), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SourceRoot(_)));
    }
}
