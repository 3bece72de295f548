//! Inspecting what previous runs quarantined.

use crate::duplicates::QUARANTINE_DIR;
use crate::error::{ErrorKind, Result};
use casemover_storage::{extended_path, probe};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;

/// A folder waiting for review in `_DUPLICATES/<identifier>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedFolder {
    /// Name of the per-identifier directory.
    pub identifier: String,
    pub name: String,
    pub path: PathBuf,
    pub modified: OffsetDateTime,
    /// Whole days between `modified` and the time of inspection.
    pub age_days: i64,
}

/// Lists quarantined folders under `destination`, oldest first.
///
/// A missing quarantine root is an empty list; stray files are ignored.
pub async fn list_quarantined(destination: &Path, now: OffsetDateTime) -> Result<Vec<QuarantinedFolder>> {
    let root = destination.join(QUARANTINE_DIR);
    let mut groups = match fs::read_dir(extended_path(&root)).await {
        Ok(groups) => groups,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            tracing::info!(path = %root.display(), "No quarantine directory");
            return Ok(Vec::new());
        },
        Err(e) => {
            tracing::error!(path = %root.display(), error = %e, "Could not list quarantine directory");
            exn::bail!(ErrorKind::Quarantine(root));
        },
    };
    let mut found = Vec::new();
    loop {
        let group = match groups.next_entry().await {
            Ok(Some(group)) => group,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(path = %root.display(), error = %e, "Could not list quarantine directory");
                exn::bail!(ErrorKind::Quarantine(root));
            },
        };
        let group_path = group.path();
        if !probe::is_directory(&group_path).await {
            continue;
        }
        let identifier = group.file_name().to_string_lossy().into_owned();
        let mut folders = match fs::read_dir(extended_path(&group_path)).await {
            Ok(folders) => folders,
            Err(e) => {
                tracing::warn!(path = %group_path.display(), error = %e, "Could not list quarantined folders");
                continue;
            },
        };
        while let Ok(Some(folder)) = folders.next_entry().await {
            let Ok(metadata) = folder.metadata().await else {
                tracing::warn!(path = %folder.path().display(), "Could not stat quarantined folder");
                continue;
            };
            if !metadata.is_dir() {
                continue;
            }
            let modified = metadata.modified().map(OffsetDateTime::from).unwrap_or(OffsetDateTime::UNIX_EPOCH);
            found.push(QuarantinedFolder {
                identifier: identifier.clone(),
                name: folder.file_name().to_string_lossy().into_owned(),
                path: folder.path(),
                modified,
                age_days: (now - modified).whole_days(),
            });
        }
    }
    found.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    tracing::info!(count = found.len(), "Found quarantined folders");
    Ok(found)
}
