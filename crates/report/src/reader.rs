//! Reading a previous run's report back as a resume log.

use crate::error::{ErrorKind, Result};
use casemover_engine::{PriorOutcome, ResumeRecord, Status};
use exn::ResultExt;
use std::path::{Path, PathBuf};

const REQUIRED: [&str; 2] = ["status", "source_path"];

/// Reads every outcome row of the report at `path`.
///
/// `status` and `source_path` columns are required; `case_id` and `dest_path`
/// are used when present. Parameter rows, unrecognized statuses and rows
/// without a source path are skipped.
pub fn read_prior_outcomes(path: &Path) -> Result<Vec<PriorOutcome>> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
    let headers = reader.headers().or_raise(|| ErrorKind::Read(path.to_path_buf()))?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let (status_at, source_at) = match (column("status"), column("source_path")) {
        (Some(status), Some(source)) => (status, source),
        _ => {
            let missing: Vec<&str> = REQUIRED.into_iter().filter(|name| column(name).is_none()).collect();
            exn::bail!(ErrorKind::MissingColumns { path: path.to_path_buf(), missing: missing.join(", ") });
        },
    };
    let (identifier_at, destination_at) = (column("case_id"), column("dest_path"));

    let mut outcomes = Vec::new();
    let mut ignored = 0usize;
    for record in reader.records() {
        let record = record.or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
        let field = |at: Option<usize>| at.and_then(|i| record.get(i)).map(str::trim).filter(|v| !v.is_empty());
        let (Some(status), Some(source)) = (field(Some(status_at)), field(Some(source_at))) else {
            ignored += 1;
            continue;
        };
        let Ok(status) = status.parse::<Status>() else {
            ignored += 1;
            continue;
        };
        outcomes.push(PriorOutcome {
            identifier: field(identifier_at).map(str::to_string),
            status,
            source: PathBuf::from(source),
            destination: field(destination_at).map(PathBuf::from),
        });
    }
    tracing::info!(path = %path.display(), rows = outcomes.len(), ignored, "Read prior report");
    Ok(outcomes)
}

/// Loads the completed moves of a previous report.
pub fn load_resume(path: &Path) -> Result<ResumeRecord> {
    Ok(ResumeRecord::from_outcomes(read_prior_outcomes(path)?))
}
