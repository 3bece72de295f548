//! Non-blocking existence checks.

use crate::path::extended;
use std::path::Path;
use tokio::fs;

/// Returns `true` if `path` is a directory (symlinks are not followed).
pub async fn is_directory(path: &Path) -> bool {
    fs::symlink_metadata(extended(path)).await.is_ok_and(|m| m.is_dir())
}

/// Returns `true` if anything, including a dangling symlink, occupies `path`.
pub async fn exists(path: &Path) -> bool {
    fs::symlink_metadata(extended(path)).await.is_ok()
}

/// Returns `true` if `path` is a directory whose entries can be listed.
pub async fn is_readable_directory(path: &Path) -> bool {
    is_directory(path).await && fs::read_dir(extended(path)).await.is_ok()
}
