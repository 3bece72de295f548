use crate::Status;
use casemover_storage::normalize_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One row of a previous run's outcome log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorOutcome {
    /// Absent when the log predates identifiers being recorded.
    pub identifier: Option<String>,
    pub status: Status,
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
}

/// Completed moves from a previous run, keyed by normalized source path.
///
/// Only membership is ever tested; nothing about the destination layout is
/// inferred from it.
#[derive(Debug, Clone, Default)]
pub struct ResumeRecord {
    records: Vec<PriorOutcome>,
    by_source: HashMap<PathBuf, usize>,
}
impl ResumeRecord {
    /// Keeps rows whose status is a completed move. When a source appears
    /// more than once the first completed row is kept.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = PriorOutcome>) -> Self {
        let mut record = Self::default();
        let mut ignored = 0usize;
        for mut outcome in outcomes {
            if !outcome.status.is_completed_move() {
                ignored += 1;
                continue;
            }
            let Ok(source) = normalize_path(&outcome.source) else {
                tracing::debug!(source = %outcome.source.display(), "Ignoring prior outcome with unusable source path");
                continue;
            };
            if record.by_source.contains_key(&source) {
                continue;
            }
            outcome.source = source.clone();
            record.by_source.insert(source, record.records.len());
            record.records.push(outcome);
        }
        tracing::info!(completed = record.records.len(), ignored, "Loaded resume record");
        record
    }

    /// The completed move whose source was `source`, if any.
    pub fn get(&self, source: &Path) -> Option<&PriorOutcome> {
        self.by_source.get(source).and_then(|i| self.records.get(*i))
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.by_source.contains_key(source)
    }

    /// Completed moves recorded against `identifier`, in log order.
    pub fn for_identifier<'a>(&'a self, identifier: &'a str) -> impl Iterator<Item = &'a PriorOutcome> + 'a {
        self.records.iter().filter(move |r| r.identifier.as_deref() == Some(identifier))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
