//! Turning matches into an ordered list of decisions.
//!
//! Planning runs sequentially, so destination names are claimed in one place
//! and two moves can never be assigned the same path, whatever the execution
//! concurrency later is.

use crate::duplicates::{Placement, quarantine_dir};
use crate::executor::{MISSING_MESSAGE, MoveTask};
use crate::matcher::MatchTable;
use crate::resume::PriorOutcome;
use crate::{Context, FolderIndex, IdentifierSet, MoveOutcome, ResumeRecord, Status};
use casemover_config::CollisionPolicy;
use casemover_storage::{FolderEntry, probe};
use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Highest numeric suffix tried before giving up on a name.
pub const MAX_SUFFIX: usize = 10_000;

/// Result of looking for a free destination name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The original name is free.
    Free(PathBuf),
    /// The original name was taken; this is the first free `_N` variant.
    Renamed(PathBuf),
    /// The original name was taken and the policy forbids renaming.
    Occupied(PathBuf),
    /// No free suffix up to [`MAX_SUFFIX`].
    Exhausted,
}

/// Names handed out so far, per destination directory.
///
/// A name counts as taken when it exists on disk **or** was claimed earlier in
/// the run (a dry run claims names too, so its previews match a live run).
/// Each directory has its own counters.
#[derive(Debug, Default)]
pub struct DestinationClaims {
    claimed: HashMap<PathBuf, HashSet<OsString>>,
}
impl DestinationClaims {
    async fn is_taken(&self, dir: &Path, name: &OsStr) -> bool {
        self.claimed.get(dir).is_some_and(|names| names.contains(name)) || probe::exists(&dir.join(name)).await
    }

    fn claim(&mut self, dir: &Path, name: OsString) -> PathBuf {
        let path = dir.join(&name);
        self.claimed.entry(dir.to_path_buf()).or_default().insert(name);
        path
    }

    /// Picks the destination for a folder called `name` inside `dir` and
    /// claims it. `Occupied` and `Exhausted` claim nothing.
    pub async fn resolve(&mut self, dir: &Path, name: &OsStr, policy: CollisionPolicy) -> Resolution {
        if !self.is_taken(dir, name).await {
            return Resolution::Free(self.claim(dir, name.to_os_string()));
        }
        if policy == CollisionPolicy::Skip {
            return Resolution::Occupied(dir.join(name));
        }
        for suffix in 1..=MAX_SUFFIX {
            let mut candidate = name.to_os_string();
            candidate.push(format!("_{suffix}"));
            if !self.is_taken(dir, &candidate).await {
                return Resolution::Renamed(self.claim(dir, candidate));
            }
        }
        Resolution::Exhausted
    }
}

/// One planned decision, in output order.
pub(crate) enum Step {
    /// Already decided; nothing left to do on disk.
    Done(MoveOutcome),
    /// A live move still to perform.
    Move(MoveTask),
}
impl Step {
    pub(crate) async fn run(self, ctx: &Context) -> MoveOutcome {
        match self {
            Self::Done(outcome) => outcome,
            Self::Move(task) => task.execute(ctx.clock).await,
        }
    }
}

/// Counts known once planning is done, before anything is moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanStats {
    pub identifiers: usize,
    /// Identifiers with at least one match (scanned or resumed).
    pub matched: usize,
    pub not_found: usize,
    pub multiple: usize,
    /// Live moves to perform.
    pub moves: usize,
    /// Moves previewed in dry-run mode.
    pub previews: usize,
    /// Pairs left unevaluated because `max_moves` was reached.
    pub unevaluated: usize,
}
impl PlanStats {
    pub fn limit_reached(&self) -> bool {
        self.unevaluated > 0
    }
}

pub(crate) struct Plan {
    pub steps: Vec<Step>,
    pub stats: PlanStats,
}

enum Class<'a> {
    Resumed(&'a FolderEntry, &'a PriorOutcome),
    Excluded(&'a FolderEntry, &'a str),
    Candidate(&'a FolderEntry),
    ResumeOnly(&'a PriorOutcome),
}

pub(crate) struct Planner<'a> {
    ctx: &'a Context,
    destination: &'a Path,
    resume: &'a ResumeRecord,
    claims: DestinationClaims,
    steps: Vec<Step>,
    stats: PlanStats,
    operations: usize,
}
impl<'a> Planner<'a> {
    pub(crate) fn new(ctx: &'a Context, destination: &'a Path, resume: &'a ResumeRecord) -> Self {
        Self {
            ctx,
            destination,
            resume,
            claims: DestinationClaims::default(),
            steps: Vec::new(),
            stats: PlanStats::default(),
            operations: 0,
        }
    }

    fn limit_reached(&self) -> bool {
        self.ctx.config.max_moves.is_some_and(|max| self.operations >= max)
    }

    fn done(
        &mut self,
        identifier: &str,
        status: Status,
        source: Option<&Path>,
        destination: Option<&Path>,
        message: impl Into<String>,
    ) {
        self.steps.push(Step::Done(MoveOutcome {
            timestamp: self.ctx.clock.now(),
            identifier: identifier.to_string(),
            status,
            source: source.map(Path::to_path_buf),
            destination: destination.map(Path::to_path_buf),
            message: message.into(),
        }));
    }

    pub(crate) async fn plan(mut self, identifiers: &IdentifierSet, index: &FolderIndex, table: &MatchTable) -> Plan {
        self.stats.identifiers = identifiers.len();
        for (position, identifier) in identifiers.iter().enumerate() {
            if self.ctx.cancel.is_cancelled() {
                tracing::warn!("Planning interrupted");
                break;
            }
            let id = identifier.as_str();
            let (ctx, resume) = (self.ctx, self.resume);
            let matched: Vec<&FolderEntry> =
                table.for_identifier(position).iter().filter_map(|i| index.entries().get(*i)).collect();
            let mut classes: Vec<Class> = matched
                .iter()
                .copied()
                .map(|entry| {
                    if let Some(prior) = resume.get(&entry.path) {
                        Class::Resumed(entry, prior)
                    } else if let Some(pattern) = ctx.exclusions.matches(&entry.name) {
                        Class::Excluded(entry, pattern)
                    } else {
                        Class::Candidate(entry)
                    }
                })
                .collect();
            classes.extend(
                resume
                    .for_identifier(id)
                    .filter(|prior| !matched.iter().any(|entry| entry.path == prior.source))
                    .map(Class::ResumeOnly),
            );
            let count = classes.iter().filter(|c| !matches!(c, Class::Excluded(..))).count();
            if count == 0 {
                self.stats.not_found += 1;
            } else {
                self.stats.matched += 1;
            }
            let placement = Placement::resolve(count, self.ctx.config.duplicates);
            if count > 1 {
                self.stats.multiple += 1;
                let policy = self.ctx.config.duplicates;
                tracing::info!(identifier = id, matches = count, %policy, "Multiple matches");
            }

            for class in classes {
                if self.limit_reached() {
                    self.stats.unevaluated += 1;
                    continue;
                }
                match class {
                    Class::Resumed(entry, prior) => self.resumed(id, &entry.path, prior),
                    Class::ResumeOnly(prior) => self.resumed(id, &prior.source, prior),
                    Class::Excluded(entry, pattern) => {
                        tracing::info!(identifier = id, folder = %entry.name, pattern, "Excluded");
                        let message = format!("Excluded by pattern: {pattern}");
                        self.done(id, Status::SkippedExcluded, Some(&entry.path), None, message);
                    },
                    Class::Candidate(entry) => self.candidate(id, entry, placement, count).await,
                }
            }
            if count == 0 {
                self.done(id, Status::NotFound, None, None, "No matching folders found for this identifier");
            }
        }
        if self.stats.limit_reached() {
            tracing::warn!(
                max_moves = ?self.ctx.config.max_moves,
                unevaluated = self.stats.unevaluated,
                "Reached max_moves limit; remaining folders were not evaluated"
            );
        }
        Plan { steps: self.steps, stats: self.stats }
    }

    fn resumed(&mut self, identifier: &str, source: &Path, prior: &PriorOutcome) {
        tracing::debug!(identifier, source = %source.display(), "Already processed in previous run");
        self.done(
            identifier,
            Status::SkippedResume,
            Some(source),
            prior.destination.as_deref(),
            "Already processed in previous run (resumed)",
        );
    }

    async fn candidate(&mut self, identifier: &str, entry: &FolderEntry, placement: Placement, count: usize) {
        if !probe::is_directory(&entry.path).await {
            tracing::info!(identifier, source = %entry.path.display(), "Source missing (already moved?)");
            self.done(identifier, Status::SkippedMissing, Some(&entry.path), None, MISSING_MESSAGE);
            return;
        }
        let dir = match placement {
            Placement::Skip => {
                tracing::info!(identifier, folder = %entry.name, "Skipping duplicate");
                let message = format!("Duplicate identifier skipped ({count} matches)");
                self.done(identifier, Status::SkippedDuplicate, Some(&entry.path), None, message);
                return;
            },
            Placement::Flat { .. } => self.destination.to_path_buf(),
            Placement::Quarantine => quarantine_dir(self.destination, identifier),
        };
        let Some(name) = entry.path.file_name() else {
            self.done(identifier, Status::Error, Some(&entry.path), None, "Source path has no folder name");
            return;
        };
        let (destination, renamed) = match self.claims.resolve(&dir, name, self.ctx.config.on_collision).await {
            Resolution::Free(path) => (path, None),
            Resolution::Renamed(path) => {
                let to_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                (path, Some((entry.name.clone(), to_name)))
            },
            Resolution::Occupied(path) => {
                tracing::info!(identifier, destination = %path.display(), "Destination exists, skipping");
                let message = "Destination exists (skipped due to on-collision=skip)";
                self.done(identifier, Status::SkippedExists, Some(&entry.path), Some(&path), message);
                return;
            },
            Resolution::Exhausted => {
                let message = format!("Could not find a unique name for '{}' after {MAX_SUFFIX} attempts", entry.name);
                tracing::error!(identifier, folder = %entry.name, "{message}");
                self.done(identifier, Status::Error, Some(&entry.path), None, message);
                return;
            },
        };
        let task = MoveTask {
            identifier: identifier.to_string(),
            source: entry.path.clone(),
            destination,
            placement,
            renamed,
        };
        self.operations += 1;
        if self.ctx.config.dry_run {
            self.stats.previews += 1;
            let outcome = task.preview(self.ctx.clock);
            tracing::info!(identifier, from = %task.source.display(), "[DRY RUN] {}", outcome.message);
            self.steps.push(Step::Done(outcome));
        } else {
            self.stats.moves += 1;
            self.steps.push(Step::Move(task));
        }
    }
}

/// Splits steps into consecutive batches whose moves can run at the same
/// time: within a batch, no move's source contains another move's source.
pub(crate) fn batches(steps: Vec<Step>) -> Vec<Vec<Step>> {
    let mut batches = Vec::new();
    let mut current = Vec::new();
    let mut sources: HashSet<PathBuf> = HashSet::new();
    let mut parents: HashSet<PathBuf> = HashSet::new();
    for step in steps {
        if let Step::Move(task) = &step {
            let source = task.source.as_path();
            if parents.contains(source) || source.ancestors().any(|a| sources.contains(a)) {
                tracing::debug!(source = %source.display(), "Nested move; waiting for earlier moves");
                batches.push(std::mem::take(&mut current));
                sources.clear();
                parents.clear();
            }
            parents.extend(source.ancestors().skip(1).map(Path::to_path_buf));
            sources.insert(source.to_path_buf());
        }
        current.push(step);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_free_name() {
        let temp = tempfile::tempdir().unwrap();
        let mut claims = DestinationClaims::default();
        let resolution = claims.resolve(temp.path(), OsStr::new("A"), CollisionPolicy::Rename).await;
        assert_eq!(resolution, Resolution::Free(temp.path().join("A")));
    }

    #[tokio::test]
    async fn test_suffix_is_gapless_from_existing_names() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();
        fs::create_dir(temp.path().join("A_1")).unwrap();
        let mut claims = DestinationClaims::default();
        let resolution = claims.resolve(temp.path(), OsStr::new("A"), CollisionPolicy::Rename).await;
        assert_eq!(resolution, Resolution::Renamed(temp.path().join("A_2")));
    }

    #[tokio::test]
    async fn test_claimed_names_are_taken() {
        let temp = tempfile::tempdir().unwrap();
        let mut claims = DestinationClaims::default();
        let name = OsStr::new("Case_1");
        assert_eq!(
            claims.resolve(temp.path(), name, CollisionPolicy::Rename).await,
            Resolution::Free(temp.path().join("Case_1"))
        );
        assert_eq!(
            claims.resolve(temp.path(), name, CollisionPolicy::Rename).await,
            Resolution::Renamed(temp.path().join("Case_1_1"))
        );
        assert_eq!(
            claims.resolve(temp.path(), name, CollisionPolicy::Rename).await,
            Resolution::Renamed(temp.path().join("Case_1_2"))
        );
        // Nothing was written to disk.
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_counters_are_per_directory() {
        let temp = tempfile::tempdir().unwrap();
        let (a, b) = (temp.path().join("a"), temp.path().join("b"));
        let mut claims = DestinationClaims::default();
        let name = OsStr::new("X");
        claims.resolve(&a, name, CollisionPolicy::Rename).await;
        claims.resolve(&a, name, CollisionPolicy::Rename).await;
        assert_eq!(claims.resolve(&b, name, CollisionPolicy::Rename).await, Resolution::Free(b.join("X")));
    }

    #[tokio::test]
    async fn test_skip_policy_reports_occupied() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();
        let mut claims = DestinationClaims::default();
        assert_eq!(
            claims.resolve(temp.path(), OsStr::new("A"), CollisionPolicy::Skip).await,
            Resolution::Occupied(temp.path().join("A"))
        );
    }

    fn step(source: &str) -> Step {
        Step::Move(MoveTask {
            identifier: "1".to_string(),
            source: PathBuf::from(source),
            destination: PathBuf::from("/dest").join(Path::new(source).file_name().unwrap()),
            placement: Placement::Flat { multiple: true },
            renamed: None,
        })
    }

    fn sources(batches: &[Vec<Step>]) -> Vec<Vec<&str>> {
        fn source(step: &Step) -> &str {
            match step {
                Step::Move(task) => task.source.to_str().unwrap(),
                Step::Done(_) => "done",
            }
        }
        batches.iter().map(|batch| batch.iter().map(source).collect()).collect()
    }

    #[test]
    fn test_nested_sources_are_split() {
        let steps = vec![
            step("/src/Case_1"),
            step("/src/Case_2"),
            step("/src/Case_1/Case_1_sub"),
            step("/src/Case_3"),
            step("/src"),
        ];
        let batches = batches(steps);
        assert_eq!(
            sources(&batches),
            vec![vec!["/src/Case_1", "/src/Case_2"], vec!["/src/Case_1/Case_1_sub", "/src/Case_3"], vec!["/src"]]
        );
    }

    #[test]
    fn test_disjoint_sources_share_a_batch() {
        let steps = vec![step("/src/a/Case_1"), step("/src/b/Case_1"), step("/src/Case_10")];
        assert_eq!(batches(steps).len(), 1);
        assert!(batches(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_exhausted() {
        let temp = tempfile::tempdir().unwrap();
        let mut claims = DestinationClaims::default();
        let name = OsStr::new("A");
        let mut taken = HashSet::from([OsString::from("A")]);
        taken.extend((1..=MAX_SUFFIX).map(|n| OsString::from(format!("A_{n}"))));
        claims.claimed.insert(temp.path().to_path_buf(), taken);
        assert_eq!(claims.resolve(temp.path(), name, CollisionPolicy::Rename).await, Resolution::Exhausted);
    }
}
