//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Every variant is fatal: configuration is resolved before any filesystem
/// work begins, so none of these can be retried without operator input.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The configuration file extension is not one of toml, yaml, yml or json.
    #[display("unsupported configuration format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// The merged configuration sources could not be deserialized.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
    /// A field deserialized fine but holds an unusable value.
    #[display("invalid value for `{field}`: {reason}")]
    Validation { field: &'static str, reason: &'static str },
    /// A policy name was not recognised.
    #[display("unknown {field} `{value}`")]
    UnknownValue { field: &'static str, value: String },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::Validation { field: "concurrency", reason: "must be at least 1" }.to_string(),
            "invalid value for `concurrency`: must be at least 1"
        );
        assert_eq!(
            ErrorKind::UnknownValue { field: "matcher", value: "fuzzy".to_string() }.to_string(),
            "unknown matcher `fuzzy`"
        );
    }
}
