//! Storage models.

use std::path::PathBuf;
use time::OffsetDateTime;

/// One directory discovered while walking a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    /// Leaf name only, lossily converted for matching.
    pub name: String,
    /// Absolute, normalized path of the directory.
    pub path: PathBuf,
    /// Last modified timestamp at scan time.
    pub modified: OffsetDateTime,
}
impl FolderEntry {
    pub fn new(path: impl Into<PathBuf>, modified: OffsetDateTime) -> Self {
        let path = path.into();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Self { name, path, modified }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_leaf_component() {
        let entry = FolderEntry::new("/data/src/2023/Case_00123", OffsetDateTime::UNIX_EPOCH);
        assert_eq!(entry.name, "Case_00123");
        assert_eq!(entry.path, PathBuf::from("/data/src/2023/Case_00123"));
    }
}
