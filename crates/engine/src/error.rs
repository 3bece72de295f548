//! Engine Error Types
//!
//! Only failures that stop a run before any folder is touched are errors.
//! Everything that goes wrong for an individual identifier/folder pair is
//! reported as an [`ERROR`](crate::Status::Error) outcome instead.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An engine error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The identifier list was empty after normalization.
    #[display("no identifiers to process")]
    NoIdentifiers,
    /// The source root is missing, unreadable, or not a directory.
    #[display("source root is not a readable directory: {}", _0.display())]
    SourceRoot(#[error(not(source))] PathBuf),
    /// The destination root exists but is not a directory, or is (or lies
    /// inside) the source root.
    #[display("unusable destination root: {}", _0.display())]
    DestinationRoot(#[error(not(source))] PathBuf),
    /// An exclusion pattern could not be compiled.
    #[display("invalid exclusion pattern `{_0}`")]
    Pattern(#[error(not(source))] String),
    /// The quarantine root exists but could not be listed.
    #[display("could not inspect quarantine at {}", _0.display())]
    Quarantine(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceRoot(_) | Self::Quarantine(_))
    }
}
