//! Directory relocation.
//!
//! These functions are blocking; async callers should run them inside
//! [`spawn_blocking`](tokio::task::spawn_blocking).

use crate::error::{ErrorKind, Result};
use crate::path::extended;
use exn::ResultExt;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

/// How a directory reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Same volume; a single atomic rename.
    Renamed,
    /// Different volumes; the tree was copied, then the source removed.
    Copied,
}

/// Returns `true` if `path` is a directory (symlinks are not followed).
pub fn is_directory(path: &Path) -> bool {
    fs::symlink_metadata(extended(path)).is_ok_and(|m| m.is_dir())
}

/// Returns `true` if anything, including a dangling symlink, occupies `path`.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(extended(path)).is_ok()
}

/// Moves the directory `from` to `to`, creating `to`'s parents as needed.
///
/// Never overwrites: `to` must not exist. When the rename crosses volumes the
/// tree is copied and the source removed afterwards. A copy that fails
/// part-way is removed again and reported as [`ErrorKind::PartialCopy`], with
/// the source untouched.
pub fn move_dir(from: &Path, to: &Path) -> Result<Transfer> {
    let src = extended(from);
    let dst = extended(to);
    let metadata = fs::symlink_metadata(&src).map_err(|e| ErrorKind::from_io(e, from))?;
    if !metadata.is_dir() {
        exn::bail!(ErrorKind::NotADirectory(from.to_path_buf()));
    }
    // `rename` happily replaces an empty directory on some platforms.
    if exists(to) {
        exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| ErrorKind::from_io(e, to))?;
    }
    match fs::rename(&src, &dst) {
        Ok(()) => Ok(Transfer::Renamed),
        Err(e) if e.kind() == IoErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), to = %to.display(), "Rename crosses volumes; copying instead");
            if let Err(e) = copy_tree(&src, &dst) {
                if let Err(cleanup) = fs::remove_dir_all(&dst) {
                    tracing::warn!(path = %to.display(), error = %cleanup, "Could not remove partial copy");
                }
                return Err(e).or_raise(|| ErrorKind::PartialCopy(to.to_path_buf()));
            }
            fs::remove_dir_all(&src)
                .map_err(|e| ErrorKind::from_io(e, from))
                .or_raise(|| ErrorKind::SourceNotRemoved(to.to_path_buf()))?;
            Ok(Transfer::Copied)
        },
        Err(e) => Err(ErrorKind::from_io(e, from).into()),
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir(to).map_err(|e| ErrorKind::from_io(e, to))?;
    for entry in fs::read_dir(from).map_err(|e| ErrorKind::from_io(e, from))? {
        let entry = entry.map_err(|e| ErrorKind::from_io(e, from))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| ErrorKind::from_io(e, &source))?;
        if file_type.is_dir() {
            copy_tree(&source, &target)?;
        } else if file_type.is_symlink() {
            copy_symlink(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(|e| ErrorKind::from_io(e, &source))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let link = fs::read_link(from).map_err(|e| ErrorKind::from_io(e, from))?;
    std::os::unix::fs::symlink(link, to).map_err(|e| ErrorKind::from_io(e, to))?;
    Ok(())
}

#[cfg(windows)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};
    let link = fs::read_link(from).map_err(|e| ErrorKind::from_io(e, from))?;
    let points_to_dir = fs::metadata(from).is_ok_and(|m| m.is_dir());
    let created = if points_to_dir { symlink_dir(&link, to) } else { symlink_file(&link, to) };
    created.map_err(|e| ErrorKind::from_io(e, to))?;
    Ok(())
}
