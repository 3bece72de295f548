//! Streaming CSV outcome report.
//!
//! One header row, then optional `PARAMETER` rows closed by an
//! [`END_PARAMETERS`] marker, then one row per [`MoveOutcome`] in the order
//! they were produced. Rows are written as they arrive and the file is flushed
//! periodically, so an interrupted run still leaves a usable resume log.

use crate::error::{ErrorKind, Result};
use casemover_config::Config;
use casemover_engine::MoveOutcome;
use exn::ResultExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub const COLUMNS: [&str; 6] = ["timestamp", "case_id", "status", "source_path", "dest_path", "message"];
pub const PARAMETER_STATUS: &str = "PARAMETER";
pub const END_PARAMETERS: &str = "--- END PARAMETERS ---";

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const FLUSH_EVERY: usize = 100;

pub fn format_timestamp(at: OffsetDateTime) -> Result<String> {
    at.format(TIMESTAMP_FORMAT).or_raise(|| ErrorKind::Timestamp)
}

/// Parameter rows describing how a run was configured.
pub fn config_parameters(config: &Config) -> Vec<(&'static str, String)> {
    let optional = |value: Option<usize>| value.map(|v| v.to_string()).unwrap_or_default();
    vec![
        ("dry_run", config.dry_run.to_string()),
        ("matcher", config.matcher.to_string()),
        ("duplicates", config.duplicates.to_string()),
        ("on_collision", config.on_collision.to_string()),
        ("exclude", config.exclude.join("; ")),
        ("max_folders", optional(config.max_folders)),
        ("max_moves", optional(config.max_moves)),
        ("identifier_limit", optional(config.identifier_limit)),
        ("concurrency", config.concurrency.to_string()),
    ]
}

pub struct ReportWriter<W: Write> {
    path: PathBuf,
    csv: csv::Writer<W>,
    rows: usize,
}

impl ReportWriter<File> {
    /// Creates (or truncates) the report at `path`, creating parent
    /// directories as needed.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Write(path.clone()))?;
        }
        let file = File::create(&path).or_raise(|| ErrorKind::Write(path.clone()))?;
        tracing::info!(path = %path.display(), "Opened report");
        Self::new(path, file)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wraps `inner`, writing the header row immediately. `path` is only used
    /// to describe errors.
    pub fn new(path: impl Into<PathBuf>, inner: W) -> Result<Self> {
        let mut writer = Self { path: path.into(), csv: csv::Writer::from_writer(inner), rows: 0 };
        writer.record(COLUMNS)?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far, parameters included.
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn record<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.csv.write_record(fields).or_raise(|| ErrorKind::Write(self.path.clone()))
    }

    /// Writes one `PARAMETER` row per non-empty value, then the end marker.
    pub fn write_parameters<K, V>(&mut self, at: OffsetDateTime, parameters: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let timestamp = format_timestamp(at)?;
        for (key, value) in parameters {
            let (key, value) = (key.as_ref(), value.as_ref());
            if value.is_empty() {
                continue;
            }
            let message = format!("{key}={value}");
            self.record([timestamp.as_str(), "", PARAMETER_STATUS, "", "", message.as_str()])?;
            self.rows += 1;
        }
        self.record([timestamp.as_str(), "", PARAMETER_STATUS, "", "", END_PARAMETERS])?;
        self.rows += 1;
        self.flush()
    }

    pub fn write_outcome(&mut self, outcome: &MoveOutcome) -> Result<()> {
        let path = |p: &Option<PathBuf>| p.as_deref().map(|p| p.display().to_string()).unwrap_or_default();
        self.record([
            format_timestamp(outcome.timestamp)?,
            outcome.identifier.clone(),
            outcome.status.to_string(),
            path(&outcome.source),
            path(&outcome.destination),
            outcome.message.clone(),
        ])?;
        self.rows += 1;
        if self.rows % FLUSH_EVERY == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.csv.flush().or_raise(|| ErrorKind::Write(self.path.clone()))
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        let Self { path, csv, rows } = self;
        tracing::info!(rows, path = %path.display(), "Report closed");
        let inner = csv.into_inner().map_err(|_| ErrorKind::Write(path))?;
        Ok(inner)
    }
}
