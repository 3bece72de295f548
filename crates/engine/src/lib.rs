//! Matching and move orchestration.
//!
//! A run takes an [`IdentifierSet`], scans the source tree once into a
//! [`FolderIndex`], matches every identifier against every folder name, and
//! decides for each identifier/folder pair what to do: move it, quarantine
//! it, skip it, or report why not. Every decision becomes exactly one
//! [`MoveOutcome`]; see [`relocate`] for the event stream driving a run.

mod duplicates;
pub mod error;
mod exclude;
mod executor;
mod identifiers;
mod index;
mod matcher;
mod outcome;
mod plan;
mod quarantine;
mod resume;
mod stream;
mod summary;

pub use crate::duplicates::{Placement, QUARANTINE_DIR, quarantine_dir};
pub use crate::exclude::ExclusionFilter;
pub use crate::identifiers::{Identifier, IdentifierSet};
pub use crate::index::FolderIndex;
pub use crate::matcher::{MatchTable, Matcher};
pub use crate::outcome::{MoveOutcome, Status, UnknownStatus};
pub use crate::plan::{DestinationClaims, MAX_SUFFIX, PlanStats, Resolution};
pub use crate::quarantine::{QuarantinedFolder, list_quarantined};
pub use crate::resume::{PriorOutcome, ResumeRecord};
pub use crate::stream::{Job, RunEvent, relocate};
pub use crate::summary::Summary;
use crate::error::Result;
use casemover_config::Config;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

/// Source of outcome timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    /// Every timestamp is this instant; makes repeated runs comparable.
    Fixed(OffsetDateTime),
}
impl Clock {
    pub fn now(&self) -> OffsetDateTime {
        match self {
            Self::System => OffsetDateTime::now_utc(),
            Self::Fixed(at) => *at,
        }
    }
}

/// Everything a run needs besides its inputs, passed explicitly.
pub struct Context {
    pub config: Config,
    pub exclusions: ExclusionFilter,
    pub clock: Clock,
    /// Cancelling stops new moves from being started; moves already in
    /// flight finish and are reported.
    pub cancel: CancellationToken,
}
impl Context {
    pub fn new(config: Config) -> Result<Self> {
        let exclusions = ExclusionFilter::new(&config.exclude)?;
        Ok(Self { config, exclusions, clock: Clock::System, cancel: CancellationToken::new() })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
