use crate::{MoveOutcome, PlanStats, Status};
use std::collections::BTreeMap;

/// End-of-run totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub folders_scanned: usize,
    pub scan_errors: usize,
    pub plan: PlanStats,
    pub statuses: BTreeMap<Status, usize>,
    /// The run was interrupted before every planned decision was recorded.
    pub cancelled: bool,
}
impl Summary {
    pub fn record(&mut self, outcome: &MoveOutcome) {
        *self.statuses.entry(outcome.status).or_default() += 1;
    }

    pub fn count(&self, status: Status) -> usize {
        self.statuses.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.statuses.values().sum()
    }

    pub fn errors(&self) -> usize {
        self.count(Status::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    /// Folders actually relocated.
    pub fn completed_moves(&self) -> usize {
        self.statuses.iter().filter(|(s, _)| s.is_completed_move()).map(|(_, n)| n).sum()
    }

    pub fn skipped(&self) -> usize {
        self.statuses.iter().filter(|(s, _)| s.is_skip()).map(|(_, n)| n).sum()
    }
}
