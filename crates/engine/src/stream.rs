use crate::error::{ErrorKind, Result};
use crate::plan::{Planner, batches};
use crate::{Context, FolderIndex, IdentifierSet, Matcher, MoveOutcome, PlanStats, ResumeRecord, Summary};
use async_stream::stream;
use casemover_storage::{normalize_path, probe};
use exn::ResultExt;
use futures::{Stream, StreamExt, future};
use std::path::{Path, PathBuf};

const PROGRESS_EVERY: usize = 100;

/// The inputs of one run.
#[derive(Debug, Clone)]
pub struct Job {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub identifiers: IdentifierSet,
    /// Completed moves from an earlier run, to be skipped.
    pub resume: ResumeRecord,
}
impl Job {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, identifiers: IdentifierSet) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            identifiers,
            resume: ResumeRecord::default(),
        }
    }

    pub fn with_resume(mut self, resume: ResumeRecord) -> Self {
        self.resume = resume;
        self
    }
}

/// Progress of a run, as yielded by [`relocate`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`Advisory`](Self::Advisory), at most once, if the requested matcher
///    was replaced.
/// 3. [`Indexed`](Self::Indexed), once the source tree has been scanned.
/// 4. [`Planned`](Self::Planned), before anything on disk is touched. The
///    stream is lazy, so a consumer may stop here (e.g. to ask for
///    confirmation) and nothing will be moved.
/// 5. [`Outcome`](Self::Outcome), once per decision, in identifier order.
/// 6. [`Complete`](Self::Complete), exactly once.
///
/// A configuration error ends the stream early with a single `Err` item, and
/// always before the first folder is moved.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Started,
    Advisory(String),
    Indexed { folders: usize, skipped: usize },
    Planned(PlanStats),
    Outcome(MoveOutcome),
    Complete(Summary),
}

/// Runs `job`, streaming [`RunEvent`]s.
///
/// Planning is sequential; live moves are then executed up to
/// `ctx.config.concurrency` at a time while outcomes are still yielded in plan
/// order. A move whose source contains, or lies inside, the source of another
/// move never runs alongside it. Cancelling `ctx.cancel` stops further moves
/// from being started.
pub fn relocate<'a>(job: Job, ctx: &'a Context) -> impl Stream<Item = Result<RunEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(RunEvent::Started);
        let Job { source, destination, identifiers, resume } = job;
        if identifiers.is_empty() {
            yield Err(exn::Exn::from(ErrorKind::NoIdentifiers));
            return;
        }
        let destination = match check_destination(&source, &destination).await {
            Ok(destination) => destination,
            Err(e) => {
                yield Err(e);
                return;
            },
        };

        let matcher = Matcher::new(ctx.config.matcher, &identifiers);
        if let Some(advisory) = matcher.advisory() {
            yield Ok(RunEvent::Advisory(advisory.to_string()));
        }
        let index = match FolderIndex::build(&source, ctx.config.max_folders).await {
            Ok(index) => index,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        yield Ok(RunEvent::Indexed { folders: index.len(), skipped: index.skipped() });

        let table = matcher.match_entries(&identifiers, index.entries());
        tracing::info!(
            identifiers = identifiers.len(),
            folders = index.len(),
            matched = table.matched(),
            matcher = %matcher.kind(),
            "Matching complete"
        );
        let plan = Planner::new(ctx, &destination, &resume).plan(&identifiers, &index, &table).await;
        yield Ok(RunEvent::Planned(plan.stats.clone()));

        let planned = plan.steps.len();
        let mut summary = Summary {
            folders_scanned: index.len(),
            scan_errors: index.skipped(),
            plan: plan.stats,
            ..Summary::default()
        };
        let concurrency = ctx.config.concurrency.max(1);
        let outcomes = futures::stream::iter(batches(plan.steps)).flat_map(move |batch| {
            futures::stream::iter(batch)
                .take_while(move |_| future::ready(!ctx.cancel.is_cancelled()))
                .map(move |step| step.run(ctx))
                .buffered(concurrency)
        });
        for await outcome in outcomes {
            summary.record(&outcome);
            if summary.total() % PROGRESS_EVERY == 0 {
                tracing::info!(processed = summary.total(), total = planned, "Processing...");
            }
            yield Ok(RunEvent::Outcome(outcome));
        }
        summary.cancelled = ctx.cancel.is_cancelled() || summary.total() < planned;
        if summary.cancelled {
            tracing::warn!(recorded = summary.total(), planned, "Run interrupted");
        }
        tracing::info!(
            recorded = summary.total(),
            moved = summary.completed_moves(),
            errors = summary.errors(),
            "Run complete"
        );
        yield Ok(RunEvent::Complete(summary));
    })
}

/// Normalizes the destination root, which may not exist yet but must not be
/// a file. It may not be the source root or lie inside it, or moved folders
/// would be scanned again by the next run.
async fn check_destination(source: &Path, destination: &Path) -> Result<PathBuf> {
    let normalized = normalize_path(destination).or_raise(|| ErrorKind::DestinationRoot(destination.to_path_buf()))?;
    if probe::exists(&normalized).await && !probe::is_directory(&normalized).await {
        exn::bail!(ErrorKind::DestinationRoot(normalized));
    }
    if normalize_path(source).is_ok_and(|source| normalized.starts_with(source)) {
        exn::bail!(ErrorKind::DestinationRoot(normalized));
    }
    Ok(normalized)
}
