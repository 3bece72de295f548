//! Identifier-to-folder substring matching.
//!
//! An identifier matches a folder when the folder's leaf name contains it as
//! a literal, case-sensitive substring. Two algorithms are available and
//! always agree; [`MatcherKind`] only selects the faster one for the workload:
//!
//! - **bucket**: identifiers grouped by length, each tested per name with a
//!   precompiled substring finder.
//! - **automaton**: a single Aho-Corasick automaton over all identifiers,
//!   streaming each name once. Only available with the `automaton` feature;
//!   without it the bucket matcher is used and an advisory is recorded.

mod bucket;
#[cfg(feature = "automaton")]
mod automaton;

use crate::IdentifierSet;
use casemover_config::MatcherKind;
use casemover_storage::FolderEntry;

enum Algorithm {
    Bucket(bucket::Bucket),
    #[cfg(feature = "automaton")]
    Automaton(automaton::Automaton),
}

/// Matcher selected once per run.
pub struct Matcher {
    algorithm: Algorithm,
    advisory: Option<String>,
}
impl Matcher {
    /// Builds the requested algorithm, falling back to the bucket matcher if
    /// the automaton is unavailable or cannot be built. A fallback never
    /// fails; it is reported through [`advisory`](Self::advisory).
    pub fn new(kind: MatcherKind, identifiers: &IdentifierSet) -> Self {
        match kind {
            MatcherKind::Bucket => Self::bucket(identifiers, None),
            #[cfg(feature = "automaton")]
            MatcherKind::Automaton => match automaton::Automaton::new(identifiers) {
                Ok(automaton) => Self { algorithm: Algorithm::Automaton(automaton), advisory: None },
                Err(e) => {
                    let advisory = format!("automaton matcher could not be built ({e}); using bucket matcher");
                    Self::bucket(identifiers, Some(advisory))
                },
            },
            #[cfg(not(feature = "automaton"))]
            MatcherKind::Automaton => {
                let advisory = "automaton matcher not available in this build; using bucket matcher";
                Self::bucket(identifiers, Some(advisory.to_string()))
            },
        }
    }

    fn bucket(identifiers: &IdentifierSet, advisory: Option<String>) -> Self {
        if let Some(advisory) = &advisory {
            tracing::warn!("{advisory}");
        }
        Self { algorithm: Algorithm::Bucket(bucket::Bucket::new(identifiers)), advisory }
    }

    /// The algorithm actually in use.
    pub fn kind(&self) -> MatcherKind {
        match self.algorithm {
            Algorithm::Bucket(_) => MatcherKind::Bucket,
            #[cfg(feature = "automaton")]
            Algorithm::Automaton(_) => MatcherKind::Automaton,
        }
    }

    /// Why the requested algorithm was replaced, if it was.
    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    /// Indices (into the [`IdentifierSet`]) of every identifier contained in
    /// `name`, ascending and without repeats.
    pub fn find(&self, name: &str) -> Vec<usize> {
        let mut hits = Vec::new();
        match &self.algorithm {
            Algorithm::Bucket(bucket) => bucket.find(name, &mut hits),
            #[cfg(feature = "automaton")]
            Algorithm::Automaton(automaton) => automaton.find(name, &mut hits),
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Matches every entry, returning each identifier's entries in scan order.
    pub fn match_entries(&self, identifiers: &IdentifierSet, entries: &[FolderEntry]) -> MatchTable {
        let mut table = vec![Vec::new(); identifiers.len()];
        for (position, entry) in entries.iter().enumerate() {
            for identifier in self.find(&entry.name) {
                table[identifier].push(position);
            }
        }
        MatchTable { table }
    }
}

/// For each identifier (by set position), the positions of its matching
/// entries in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTable {
    table: Vec<Vec<usize>>,
}
impl MatchTable {
    pub fn for_identifier(&self, identifier: usize) -> &[usize] {
        self.table.get(identifier).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of identifiers with at least one match.
    pub fn matched(&self) -> usize {
        self.table.iter().filter(|m| !m.is_empty()).count()
    }
}
