//! Report Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A report error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// An input file (identifier list or prior report) does not exist.
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// An input file could not be opened or parsed.
    #[display("could not read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// The report could not be created or written to.
    #[display("could not write report {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// A prior report lacks columns needed to resume from it.
    #[display("{} is missing required columns: {missing}", path.display())]
    MissingColumns { path: PathBuf, missing: String },
    /// The identifier list yielded nothing to process.
    #[display("no identifiers found in {}", _0.display())]
    NoIdentifiers(#[error(not(source))] PathBuf),
    #[display("could not format timestamp")]
    Timestamp,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Write(_))
    }
}
