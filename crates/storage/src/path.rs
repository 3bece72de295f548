//! Path normalization utilities.
//!
//! Scanned folders, destinations, and paths read back from a previous run's
//! report all pass through [`normalize`] so that they compare equal no matter
//! how the operator typed them. Filesystem calls go through [`extended`], which
//! on Windows adds the `\\?\` prefix that lifts the legacy `MAX_PATH` limit.

use crate::error::{ErrorKind, Result};
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Makes `path` absolute (against the current directory) and resolves `.` and
/// `..` lexically. Symlinks are **not** resolved, and the path need not exist.
///
/// `..` never climbs above the root/prefix. An empty path is rejected, as is
/// a path containing a null byte.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use casemover_storage::normalize_path;
/// # #[cfg(unix)]
/// assert_eq!(
///     normalize_path("/data/./src/../dest//Case_001/").unwrap(),
///     Path::new("/data/dest/Case_001")
/// );
/// assert!(normalize_path("").is_err());
/// ```
pub fn normalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() || path.as_os_str().as_encoded_bytes().contains(&0) {
        exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
    }
    let absolute = std::path::absolute(strip_extended(path).as_ref()).map_err(|e| ErrorKind::from_io(e, path))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => normalized.push(component),
            Component::CurDir => {},
            Component::ParentDir => {
                // Popping the root is a no-op, which is exactly what we want.
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                }
            },
        }
    }
    Ok(normalized)
}

/// Returns the form of `path` to hand to filesystem calls.
///
/// On Windows an absolute path gains the extended-length prefix (`\\?\C:\...`
/// or `\\?\UNC\server\share\...`). Everywhere else this is the identity.
pub fn extended(path: &Path) -> Cow<'_, Path> {
    #[cfg(windows)]
    {
        let raw = path.as_os_str().to_string_lossy();
        if raw.starts_with(r"\\?\") || !path.is_absolute() {
            return Cow::Borrowed(path);
        }
        if let Some(unc) = raw.strip_prefix(r"\\") {
            return Cow::Owned(PathBuf::from(format!(r"\\?\UNC\{unc}")));
        }
        Cow::Owned(PathBuf::from(format!(r"\\?\{raw}")))
    }
    #[cfg(not(windows))]
    {
        Cow::Borrowed(path)
    }
}

/// Inverse of [`extended`]: the human-readable form used in logs and reports.
pub fn strip_extended(path: &Path) -> Cow<'_, Path> {
    #[cfg(windows)]
    {
        let raw = path.as_os_str().to_string_lossy();
        if let Some(unc) = raw.strip_prefix(r"\\?\UNC\") {
            return Cow::Owned(PathBuf::from(format!(r"\\{unc}")));
        }
        if let Some(rest) = raw.strip_prefix(r"\\?\") {
            return Cow::Owned(PathBuf::from(rest));
        }
        Cow::Borrowed(path)
    }
    #[cfg(not(windows))]
    {
        Cow::Borrowed(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_normalize_absolute() {
        assert_eq!(normalize("/a/b/c").unwrap(), Path::new("/a/b/c"));
        assert_eq!(normalize("/a//b/./c/").unwrap(), Path::new("/a/b/c"));
        assert_eq!(normalize("/a/b/../c").unwrap(), Path::new("/a/c"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_never_climbs_above_root() {
        assert_eq!(normalize("/../../a").unwrap(), Path::new("/a"));
        assert_eq!(normalize("/..").unwrap(), Path::new("/"));
    }

    #[test]
    fn test_normalize_relative_is_made_absolute() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(normalize("some/dir").unwrap(), cwd.join("some").join("dir"));
        assert_eq!(normalize("./some/../dir").unwrap(), cwd.join("dir"));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize("").is_err());
        assert!(normalize("a\0b").is_err());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_extended_is_identity() {
        let path = Path::new("/data/Case_00123");
        assert_eq!(extended(path), path);
        assert_eq!(strip_extended(path), path);
    }

    #[cfg(windows)]
    #[test]
    fn test_extended_round_trip() {
        let local = Path::new(r"C:\Data\Case_00123");
        assert_eq!(extended(local), Path::new(r"\\?\C:\Data\Case_00123"));
        assert_eq!(strip_extended(&extended(local)), local);
        let unc = Path::new(r"\\server\share\Case_00123");
        assert_eq!(extended(unc), Path::new(r"\\?\UNC\server\share\Case_00123"));
        assert_eq!(strip_extended(&extended(unc)), unc);
    }
}
