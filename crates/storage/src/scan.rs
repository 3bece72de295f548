//! Directory tree walking.

use crate::FolderEntry;
use crate::error::{ErrorKind, Result};
use crate::path::extended;
use async_stream::stream;
use futures::Stream;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;

/// Walks every directory below `root` (the root itself is not yielded).
///
/// Parents are yielded before their children and siblings are visited in
/// name order, so two walks over an unchanged tree produce the same sequence.
/// Symlinks are never followed and anything that is not a directory is
/// ignored.
///
/// A directory that cannot be listed yields an `Err` and its subtree is
/// skipped; the walk carries on with the next sibling. Callers decide whether
/// an unreadable `root` is fatal by checking it before walking.
pub fn walk(root: impl Into<PathBuf>) -> impl Stream<Item = Result<FolderEntry>> {
    let root = root.into();
    stream! {
        // Pending entries are kept reversed so `pop()` returns the next one in
        // pre-order.
        let mut pending = match children(&root).await {
            Ok(children) => children,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        while let Some(entry) = pending.pop() {
            let path = entry.path.clone();
            yield Ok(entry);
            match children(&path).await {
                Ok(children) => pending.extend(children),
                Err(e) => yield Err(e),
            }
        }
    }
}

/// Immediate sub-directories of `dir`, sorted by name in *descending* order.
async fn children(dir: &Path) -> Result<Vec<FolderEntry>> {
    let mut entries = fs::read_dir(extended(dir)).await.map_err(|e| ErrorKind::from_io(e, dir))?;
    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| ErrorKind::from_io(e, dir))? {
        // `DirEntry::file_type` does not traverse symlinks.
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => {},
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "Could not determine entry type; skipping");
                continue;
            },
        }
        let modified = match entry.metadata().await.and_then(|m| m.modified()) {
            Ok(modified) => OffsetDateTime::from(modified),
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "Modification time unavailable");
                OffsetDateTime::UNIX_EPOCH
            },
        };
        found.push(FolderEntry::new(dir.join(entry.file_name()), modified));
    }
    found.sort_by(|a, b| b.path.file_name().cmp(&a.path.file_name()));
    Ok(found)
}
