//! Performing (or previewing) a single planned move.

use crate::duplicates::Placement;
use crate::{Clock, MoveOutcome, Status};
use casemover_storage::error::ErrorKind as StorageErrorKind;
use casemover_storage::{Transfer, move_dir, relocate};
use std::path::PathBuf;

pub(crate) const MISSING_MESSAGE: &str = "Source folder no longer exists (may have been moved already)";

/// A move decided during planning: source, final destination (suffix already
/// applied), and how the pair was placed.
#[derive(Debug, Clone)]
pub(crate) struct MoveTask {
    pub identifier: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub placement: Placement,
    /// Source leaf name and destination leaf name, when they differ.
    pub renamed: Option<(String, String)>,
}
impl MoveTask {
    fn outcome(&self, clock: Clock, status: Status, message: String) -> MoveOutcome {
        MoveOutcome {
            timestamp: clock.now(),
            identifier: self.identifier.clone(),
            status,
            source: Some(self.source.clone()),
            destination: Some(self.destination.clone()),
            message,
        }
    }

    fn with_prefix(&self, message: String) -> String {
        if self.placement.is_multiple() { format!("[Multiple matches] {message}") } else { message }
    }

    /// The dry-run record: everything a live run would decide, nothing done.
    pub(crate) fn preview(&self, clock: Clock) -> MoveOutcome {
        let to = self.destination.display();
        let (status, message) = match (self.placement, &self.renamed) {
            (Placement::Quarantine, None) => {
                (Status::FoundDryRunQuarantine, format!("Would quarantine duplicate to {to}"))
            },
            (Placement::Quarantine, Some((from_name, to_name))) => (
                Status::FoundDryRunQuarantine,
                format!("Would quarantine to {to} (renamed from {from_name} to {to_name})"),
            ),
            (_, None) => (Status::FoundDryRun, format!("Would move to {to}")),
            (_, Some((from_name, to_name))) => {
                (Status::FoundDryRunRenamed, format!("Would move to {to} (renamed from {from_name} to {to_name})"))
            },
        };
        let message = self.with_prefix(message);
        self.outcome(clock, status, message)
    }

    fn completed(&self, clock: Clock, transfer: Transfer) -> MoveOutcome {
        let (status, message) = match (self.placement, &self.renamed) {
            (Placement::Quarantine, None) => {
                (Status::Quarantined, format!("Quarantined duplicate to {}", self.destination.display()))
            },
            (Placement::Quarantine, Some((from_name, to_name))) => {
                (Status::QuarantinedRenamed, format!("Quarantined duplicate (renamed from {from_name} to {to_name})"))
            },
            (placement, None) => (status_for(placement, false), "Moved successfully".to_string()),
            (placement, Some((from_name, to_name))) => {
                (status_for(placement, true), format!("Moved successfully (renamed from {from_name} to {to_name})"))
            },
        };
        let message = match transfer {
            Transfer::Renamed => message,
            Transfer::Copied => format!("{message}; copied across volumes"),
        };
        let message = self.with_prefix(message);
        self.outcome(clock, status, message)
    }

    /// Moves the folder, re-checking both ends first since the tree may have
    /// changed since planning. Never fails: problems become outcomes.
    pub(crate) async fn execute(self, clock: Clock) -> MoveOutcome {
        let source = self.source.clone();
        let destination = self.destination.clone();
        let result = tokio::task::spawn_blocking(move || {
            if !relocate::is_directory(&source) {
                return Ok(None);
            }
            move_dir(&source, &destination).map(Some)
        })
        .await;
        match result {
            Ok(Ok(Some(transfer))) => {
                tracing::info!(
                    identifier = %self.identifier,
                    from = %self.source.display(),
                    to = %self.destination.display(),
                    ?transfer,
                    "Moved folder"
                );
                self.completed(clock, transfer)
            },
            Ok(Ok(None)) => {
                tracing::info!(path = %self.source.display(), "Source missing at move time (already moved?)");
                let mut outcome = self.outcome(clock, Status::SkippedMissing, MISSING_MESSAGE.to_string());
                outcome.destination = None;
                outcome
            },
            Ok(Err(e)) => {
                let message = match &*e {
                    StorageErrorKind::AlreadyExists(path) => {
                        format!("Destination appeared after planning; not overwritten: {}", path.display())
                    },
                    kind => kind.to_string(),
                };
                tracing::error!(
                    from = %self.source.display(),
                    to = %self.destination.display(),
                    error = ?e,
                    "Move failed"
                );
                self.outcome(clock, Status::Error, message)
            },
            Err(e) => {
                tracing::error!(from = %self.source.display(), error = %e, "Move task did not complete");
                self.outcome(clock, Status::Error, format!("Move task did not complete: {e}"))
            },
        }
    }
}

fn status_for(placement: Placement, renamed: bool) -> Status {
    match (placement, renamed) {
        (Placement::Flat { multiple: true }, _) => Status::MultipleMatches,
        (_, false) => Status::Moved,
        (_, true) => Status::MovedRenamed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use time::macros::datetime;

    const CLOCK: Clock = Clock::Fixed(datetime!(2024-05-01 12:00:00 UTC));

    fn task(source: PathBuf, destination: PathBuf, placement: Placement) -> MoveTask {
        MoveTask { identifier: "00123".to_string(), source, destination, placement, renamed: None }
    }

    #[tokio::test]
    async fn test_execute_moves_folder() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("src/Case_00123");
        fs::create_dir_all(&source).unwrap();
        let destination = temp.path().join("dest/Case_00123");
        let planned = task(source.clone(), destination.clone(), Placement::Flat { multiple: false });
        let outcome = planned.execute(CLOCK).await;
        assert_eq!(outcome.status, Status::Moved);
        assert_eq!(outcome.message, "Moved successfully");
        assert_eq!(outcome.timestamp, datetime!(2024-05-01 12:00:00 UTC));
        assert!(!source.exists());
        assert!(destination.is_dir());
    }

    #[tokio::test]
    async fn test_execute_source_deleted_after_planning() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("Case_00123");
        fs::create_dir(&source).unwrap();
        let planned = task(source.clone(), temp.path().join("dest/Case_00123"), Placement::Flat { multiple: false });
        fs::remove_dir(&source).unwrap();
        let outcome = planned.execute(CLOCK).await;
        assert_eq!(outcome.status, Status::SkippedMissing);
        assert!(!temp.path().join("dest").exists());
    }

    #[tokio::test]
    async fn test_execute_destination_appeared_after_planning() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("src/Case_00123");
        let destination = temp.path().join("dest/Case_00123");
        fs::create_dir_all(&source).unwrap();
        let planned = task(source.clone(), destination.clone(), Placement::Flat { multiple: false });
        fs::create_dir_all(destination.join("someone_elses_data")).unwrap();
        let outcome = planned.execute(CLOCK).await;
        assert_eq!(outcome.status, Status::Error);
        assert!(outcome.message.contains("not overwritten"));
        assert!(source.is_dir());
        assert!(destination.join("someone_elses_data").is_dir());
    }

    #[tokio::test]
    async fn test_execute_quarantine_renamed() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("Case_00123_2023");
        fs::create_dir(&source).unwrap();
        let destination = temp.path().join("_DUPLICATES/00123/Case_00123_2023_1");
        let mut planned = task(source, destination.clone(), Placement::Quarantine);
        planned.renamed = Some(("Case_00123_2023".to_string(), "Case_00123_2023_1".to_string()));
        let outcome = planned.execute(CLOCK).await;
        assert_eq!(outcome.status, Status::QuarantinedRenamed);
        assert_eq!(
            outcome.message,
            "[Multiple matches] Quarantined duplicate (renamed from Case_00123_2023 to Case_00123_2023_1)"
        );
        assert!(destination.is_dir());
    }

    #[test]
    fn test_preview_statuses() {
        let mut planned =
            task(PathBuf::from("/src/Case_1"), PathBuf::from("/dest/Case_1"), Placement::Flat { multiple: false });
        assert_eq!(planned.preview(CLOCK).status, Status::FoundDryRun);
        planned.renamed = Some(("Case_1".to_string(), "Case_1_1".to_string()));
        assert_eq!(planned.preview(CLOCK).status, Status::FoundDryRunRenamed);
        planned.placement = Placement::Flat { multiple: true };
        let outcome = planned.preview(CLOCK);
        assert_eq!(outcome.status, Status::FoundDryRunRenamed);
        assert!(outcome.message.starts_with("[Multiple matches] Would move to"));
        planned.placement = Placement::Quarantine;
        assert_eq!(planned.preview(CLOCK).status, Status::FoundDryRunQuarantine);
    }

    #[test]
    fn test_move_all_success_status() {
        assert_eq!(status_for(Placement::Flat { multiple: true }, true), Status::MultipleMatches);
        assert_eq!(status_for(Placement::Flat { multiple: false }, true), Status::MovedRenamed);
        assert_eq!(status_for(Placement::Flat { multiple: false }, false), Status::Moved);
    }
}
