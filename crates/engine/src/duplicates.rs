use casemover_config::DuplicatePolicy;
use std::path::{Path, PathBuf};

/// Reserved directory, inside the destination root, holding quarantined
/// duplicates.
pub const QUARANTINE_DIR: &str = "_DUPLICATES";

/// Where the folders of one identifier go, decided from its match count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Flat destination. `multiple` marks a multi-match identifier placed
    /// there under [`DuplicatePolicy::MoveAll`].
    Flat { multiple: bool },
    /// `_DUPLICATES/<identifier>/` inside the destination.
    Quarantine,
    /// Left in place.
    Skip,
}
impl Placement {
    /// Depends only on the policy and on whether there is more than one match.
    pub fn resolve(matches: usize, policy: DuplicatePolicy) -> Self {
        if matches <= 1 {
            return Self::Flat { multiple: false };
        }
        match policy {
            DuplicatePolicy::Quarantine => Self::Quarantine,
            DuplicatePolicy::Skip => Self::Skip,
            DuplicatePolicy::MoveAll => Self::Flat { multiple: true },
        }
    }

    pub fn is_multiple(&self) -> bool {
        !matches!(self, Self::Flat { multiple: false })
    }
}

/// `destination/_DUPLICATES/<identifier>`, with the identifier made safe to
/// use as a single path component.
pub fn quarantine_dir(destination: &Path, identifier: &str) -> PathBuf {
    destination.join(QUARANTINE_DIR).join(sanitize_component(identifier))
}

fn sanitize_component(identifier: &str) -> String {
    let cleaned: String = identifier
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    // Windows silently drops trailing dots and spaces.
    let cleaned = cleaned.trim_end_matches(['.', ' ']);
    if cleaned.is_empty() { "_".to_string() } else { cleaned.to_string() }
}
