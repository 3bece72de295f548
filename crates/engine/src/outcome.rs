use derive_more::{Display, Error};
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use time::OffsetDateTime;

/// Terminal decision recorded for one identifier/folder pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Moved,
    MovedRenamed,
    FoundDryRun,
    FoundDryRunRenamed,
    NotFound,
    MultipleMatches,
    SkippedMissing,
    SkippedExists,
    SkippedExcluded,
    SkippedResume,
    SkippedDuplicate,
    Quarantined,
    QuarantinedRenamed,
    FoundDryRunQuarantine,
    Error,
}
impl Status {
    pub const ALL: [Status; 15] = [
        Self::Moved,
        Self::MovedRenamed,
        Self::FoundDryRun,
        Self::FoundDryRunRenamed,
        Self::NotFound,
        Self::MultipleMatches,
        Self::SkippedMissing,
        Self::SkippedExists,
        Self::SkippedExcluded,
        Self::SkippedResume,
        Self::SkippedDuplicate,
        Self::Quarantined,
        Self::QuarantinedRenamed,
        Self::FoundDryRunQuarantine,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Moved => "MOVED",
            Self::MovedRenamed => "MOVED_RENAMED",
            Self::FoundDryRun => "FOUND_DRYRUN",
            Self::FoundDryRunRenamed => "FOUND_DRYRUN_RENAMED",
            Self::NotFound => "NOT_FOUND",
            Self::MultipleMatches => "MULTIPLE_MATCHES",
            Self::SkippedMissing => "SKIPPED_MISSING",
            Self::SkippedExists => "SKIPPED_EXISTS",
            Self::SkippedExcluded => "SKIPPED_EXCLUDED",
            Self::SkippedResume => "SKIPPED_RESUME",
            Self::SkippedDuplicate => "SKIPPED_DUPLICATE",
            Self::Quarantined => "QUARANTINED",
            Self::QuarantinedRenamed => "QUARANTINED_RENAMED",
            Self::FoundDryRunQuarantine => "FOUND_DRYRUN_QUARANTINE",
            Self::Error => "ERROR",
        }
    }

    /// Whether the folder really was relocated. Only these statuses feed a
    /// later run's resume record.
    pub fn is_completed_move(&self) -> bool {
        matches!(
            self,
            Self::Moved | Self::MovedRenamed | Self::MultipleMatches | Self::Quarantined | Self::QuarantinedRenamed
        )
    }

    /// A preview of a move that would have happened outside dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::FoundDryRun | Self::FoundDryRunRenamed | Self::FoundDryRunQuarantine)
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::SkippedMissing
                | Self::SkippedExists
                | Self::SkippedExcluded
                | Self::SkippedResume
                | Self::SkippedDuplicate
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}
impl FmtDisplay for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[display("unknown outcome status `{_0}`")]
pub struct UnknownStatus(#[error(not(source))] pub String);

impl FromStr for Status {
    type Err = UnknownStatus;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// One audit record: what was decided for an identifier/folder pair, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub timestamp: OffsetDateTime,
    pub identifier: String,
    pub status: Status,
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub message: String,
}
