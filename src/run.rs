use crate::cli::RunArgs;
use crate::error::{ErrorKind, Result};
use casemover_config::Config;
use casemover_engine::{Context, Job, PlanStats, ResumeRecord, RunEvent, Summary, list_quarantined, relocate};
use casemover_report::{ReportWriter, config_parameters, load_identifiers, load_resume, render_summary};
use exn::ResultExt;
use figment::providers::Serialized;
use futures::StreamExt;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::pin;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tokio_util::sync::CancellationToken;

const REPORT_NAME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("report_[year][month][day]_[hour][minute][second].csv");

/// How a run ended, short of an error.
#[derive(Debug)]
pub enum Finished {
    Completed { summary: Summary, report: PathBuf },
    /// The operator did not confirm; nothing was moved and no report written.
    Declined,
}

pub async fn run(args: RunArgs, cancel: CancellationToken) -> Result<Finished> {
    let figment = Config::figment(args.config.as_deref())
        .or_raise(|| ErrorKind::Config)?
        .admerge(Serialized::defaults(&args.overrides));
    let config = Config::from_figment(&figment).or_raise(|| ErrorKind::Config)?;
    let identifiers = load_identifiers(&args.identifiers, config.identifiers_have_header, config.identifier_limit)
        .or_raise(|| ErrorKind::Input)?;
    let resume = match &args.resume {
        Some(path) => load_resume(path).or_raise(|| ErrorKind::Input)?,
        None => ResumeRecord::default(),
    };
    let ctx = Context::new(config).or_raise(|| ErrorKind::Config)?.with_cancellation(cancel);
    let report = match args.report {
        Some(report) => report,
        None => default_report_path(ctx.clock.now())?,
    };

    let mut parameters: Vec<(&str, String)> = vec![
        ("version", env!("CARGO_PKG_VERSION").to_string()),
        ("identifiers", args.identifiers.display().to_string()),
        ("source", args.source.display().to_string()),
        ("destination", args.destination.display().to_string()),
        ("resume", args.resume.as_ref().map(|p| p.display().to_string()).unwrap_or_default()),
    ];
    parameters.extend(config_parameters(&ctx.config));

    let job = Job::new(&args.source, &args.destination, identifiers).with_resume(resume);
    let skip_prompt = args.yes || ctx.config.dry_run;
    let confirm = |stats: PlanStats| {
        let source = args.source.clone();
        let destination = args.destination.clone();
        async move { skip_prompt || stats.moves == 0 || prompt(stats, source, destination).await }
    };
    let open = || ReportWriter::create(&report);
    match drive(job, &ctx, &parameters, open, confirm).await? {
        Some((summary, _)) => Ok(Finished::Completed { summary, report }),
        None => Ok(Finished::Declined),
    }
}

/// Consumes a run's events, writing every outcome to a report opened once
/// planning succeeded. Returns `None` when `confirm` declines the plan, in
/// which case nothing has been moved.
///
/// If the report stops accepting rows, no further moves are started; the
/// moves already in flight are drained and logged before the write error is
/// returned.
pub(crate) async fn drive<W, O, C, F>(
    job: Job,
    ctx: &Context,
    parameters: &[(&str, String)],
    open: O,
    mut confirm: C,
) -> Result<Option<(Summary, W)>>
where
    W: Write,
    O: FnOnce() -> casemover_report::error::Result<ReportWriter<W>>,
    C: FnMut(PlanStats) -> F,
    F: Future<Output = bool>,
{
    let mut open = Some(open);
    let mut writer: Option<ReportWriter<W>> = None;
    let mut written: casemover_report::error::Result<()> = Ok(());
    let mut events = pin!(relocate(job, ctx));
    while let Some(event) = events.next().await {
        match event.or_raise(|| ErrorKind::Input)? {
            RunEvent::Started => tracing::debug!("Run started"),
            RunEvent::Advisory(advisory) => eprintln!("warning: {advisory}"),
            RunEvent::Indexed { folders, skipped } => {
                tracing::info!(folders, skipped, "Source indexed");
            },
            RunEvent::Planned(stats) => {
                if !confirm(stats).await {
                    tracing::warn!("Run declined; nothing moved");
                    return Ok(None);
                }
                let Some(open) = open.take() else {
                    continue;
                };
                let mut report = open().or_raise(|| ErrorKind::Report)?;
                report.write_parameters(ctx.clock.now(), parameters).or_raise(|| ErrorKind::Report)?;
                writer = Some(report);
            },
            RunEvent::Outcome(outcome) => {
                if written.is_ok()
                    && let Some(report) = writer.as_mut()
                {
                    written = report.write_outcome(&outcome);
                    if written.is_err() {
                        let path = report.path().display();
                        tracing::error!(path = %path, "Report write failed; no new moves will start");
                        ctx.cancel.cancel();
                    }
                }
                if written.is_err() {
                    tracing::warn!(
                        identifier = %outcome.identifier,
                        status = %outcome.status,
                        source = ?outcome.source,
                        destination = ?outcome.destination,
                        "{}",
                        outcome.message
                    );
                }
            },
            RunEvent::Complete(summary) => {
                written.or_raise(|| ErrorKind::ReportWrite)?;
                let Some(report) = writer.take() else {
                    exn::bail!(ErrorKind::Report);
                };
                let inner = report.finish().or_raise(|| ErrorKind::ReportWrite)?;
                return Ok(Some((summary, inner)));
            },
        }
    }
    exn::bail!(ErrorKind::Input)
}

async fn prompt(stats: PlanStats, source: PathBuf, destination: PathBuf) -> bool {
    let answer = tokio::task::spawn_blocking(move || {
        println!(
            "About to move {} folder(s) from {} to {} ({} identifiers, {} not found).",
            stats.moves,
            source.display(),
            destination.display(),
            stats.identifiers,
            stats.not_found
        );
        dialoguer::Input::<String>::new()
            .with_prompt("Type 'yes' to continue")
            .allow_empty(true)
            .interact_text()
    })
    .await;
    match answer {
        Ok(Ok(answer)) => is_yes(&answer),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Could not read confirmation");
            false
        },
        Err(e) => {
            tracing::warn!(error = %e, "Confirmation prompt did not complete");
            false
        },
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

fn default_report_path(now: OffsetDateTime) -> Result<PathBuf> {
    let name = now.format(REPORT_NAME_FORMAT).or_raise(|| ErrorKind::Report)?;
    Ok(PathBuf::from(name))
}

pub async fn duplicates(destination: &Path) -> Result<()> {
    let now = OffsetDateTime::now_utc();
    let folders = list_quarantined(destination, now).await.or_raise(|| ErrorKind::Quarantine)?;
    if folders.is_empty() {
        println!("No quarantined folders under {}", destination.display());
        return Ok(());
    }
    println!("{:>8}  {:<19}  {:<20}  FOLDER", "AGE (d)", "MODIFIED", "IDENTIFIER");
    for folder in &folders {
        let modified = casemover_report::format_timestamp(folder.modified).or_raise(|| ErrorKind::Quarantine)?;
        println!("{:>8}  {modified:<19}  {:<20}  {}", folder.age_days, folder.identifier, folder.path.display());
    }
    println!("{} quarantined folder(s)", folders.len());
    Ok(())
}

pub fn print_summary(summary: &Summary, report: &Path) {
    print!("{}", render_summary(summary));
    println!("Report written to {}", report.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use casemover_config::{DuplicatePolicy, MatcherKind};
    use casemover_engine::{Clock, IdentifierSet, Status};
    use rstest::rstest;
    use std::fs;
    use std::time::Duration;
    use time::macros::datetime;

    const CLOCK: Clock = Clock::Fixed(datetime!(2024-05-01 12:00:00 UTC));

    fn tree() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        for name in ["Case_00123_2023", "Case_00123_2024", "Case_00456", "other/Case_00789_tmp"] {
            fs::create_dir_all(temp.path().join("src").join(name)).unwrap();
        }
        temp
    }

    /// Accepts every byte, but every flush after the first fails.
    #[derive(Debug)]
    struct FailingFlush {
        flushes: usize,
    }
    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            if self.flushes > 1 { Err(std::io::Error::other("disk full")) } else { Ok(()) }
        }
    }

    fn job(temp: &tempfile::TempDir) -> Job {
        let identifiers = IdentifierSet::from_raw(["00123", "00456", "00789", "99999"]);
        Job::new(temp.path().join("src"), temp.path().join("dest"), identifiers)
    }

    fn context(config: Config) -> Context {
        Context::new(config).unwrap().with_clock(CLOCK)
    }

    async fn report(job: Job, ctx: &Context) -> (Summary, String) {
        let parameters = config_parameters(&ctx.config);
        let open = || ReportWriter::new("memory.csv", Vec::new());
        let (summary, bytes) =
            drive(job, ctx, &parameters, open, |_| async { true }).await.unwrap().unwrap();
        (summary, String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn test_default_report_name() {
        let path = default_report_path(datetime!(2024-05-01 09:03:07 UTC)).unwrap();
        assert_eq!(path, PathBuf::from("report_20240501_090307.csv"));
    }

    #[rstest]
    #[case("yes", true)]
    #[case("  YES \n", true)]
    #[case("y", false)]
    #[case("", false)]
    #[case("yes please", false)]
    fn test_confirmation_answer(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }

    #[tokio::test]
    async fn test_dry_run_report_is_repeatable() {
        let temp = tree();
        let config = Config {
            dry_run: true,
            matcher: MatcherKind::Automaton,
            exclude: vec!["*_tmp".to_string()],
            ..Config::default()
        };
        let ctx = context(config);
        let (first_summary, first) = report(job(&temp), &ctx).await;
        let (_, second) = report(job(&temp), &ctx).await;
        assert_eq!(first, second);
        assert!(!temp.path().join("dest").exists());
        assert_eq!(first_summary.count(Status::FoundDryRunQuarantine), 2);
        assert_eq!(first_summary.count(Status::SkippedExcluded), 1);

        let lines: Vec<&str> = first.lines().collect();
        assert_eq!(lines[0], "timestamp,case_id,status,source_path,dest_path,message");
        let end = lines.iter().position(|l| l.ends_with("--- END PARAMETERS ---")).unwrap();
        assert!(lines[1..end].iter().all(|l| l.contains(",PARAMETER,")));
        assert!(lines[1..end].contains(&"2024-05-01 12:00:00,,PARAMETER,,,dry_run=true"));
        assert_eq!(lines.len() - end - 1, first_summary.total());
    }

    #[tokio::test]
    async fn test_report_feeds_resume() {
        let temp = tree();
        let ctx = context(Config { duplicates: DuplicatePolicy::Skip, ..Config::default() });
        let (summary, contents) = report(job(&temp), &ctx).await;
        assert_eq!(summary.count(Status::Moved), 2);

        let path = temp.path().join("first.csv");
        fs::write(&path, contents).unwrap();
        let resume = load_resume(&path).unwrap();
        assert_eq!(resume.len(), 2);

        let (summary, _) = report(job(&temp).with_resume(resume), &ctx).await;
        assert_eq!(summary.count(Status::SkippedResume), 2);
        assert_eq!(summary.completed_moves(), 0);
    }

    #[tokio::test]
    async fn test_declined_run_moves_nothing() {
        let temp = tree();
        let ctx = context(Config::default());
        let parameters = config_parameters(&ctx.config);
        let open = || ReportWriter::new("memory.csv", Vec::new());
        let finished = drive(job(&temp), &ctx, &parameters, open, |_| async { false }).await.unwrap();
        assert!(finished.is_none());
        assert!(temp.path().join("src/Case_00456").is_dir());
        assert!(!temp.path().join("dest").exists());
    }

    #[tokio::test]
    async fn test_input_error_before_report() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = context(Config::default());
        let job = Job::new(temp.path().join("missing"), temp.path().join("dest"), IdentifierSet::from_raw(["1"]));
        let opened = std::cell::Cell::new(false);
        let open = || {
            opened.set(true);
            ReportWriter::new("memory.csv", Vec::new())
        };
        let err = drive(job, &ctx, &[], open, |_| async { true }).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Input));
        assert!(!opened.get());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_report_write_failure_stops_and_drains_moves() {
        let temp = tempfile::tempdir().unwrap();
        let names: Vec<String> = (0..150).map(|i| format!("Case_{i:03}")).collect();
        for name in &names {
            fs::create_dir_all(temp.path().join("src").join(name)).unwrap();
        }
        let job = Job::new(temp.path().join("src"), temp.path().join("dest"), IdentifierSet::from_raw(&names));
        let ctx = context(Config { concurrency: 4, ..Config::default() });
        let open = || ReportWriter::new("memory.csv", FailingFlush { flushes: 0 });
        let err = drive(job, &ctx, &[], open, |_| async { true }).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ReportWrite));
        assert!(ctx.cancel.is_cancelled());

        let count = |dir: &str| fs::read_dir(temp.path().join(dir)).map(|d| d.count()).unwrap_or(0);
        let moved = count("dest");
        assert_eq!(moved + count("src"), names.len());
        assert!(moved >= 99 && moved < names.len());
        // Nothing is still moving in the background.
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(count("dest"), moved);
    }
}
