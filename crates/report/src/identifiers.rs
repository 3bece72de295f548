//! Reading the identifier list.
//!
//! Identifiers come from the first column of a CSV or plain-text file, read as
//! text so leading zeros and the like survive untouched.

use crate::error::{ErrorKind, Result};
use casemover_engine::IdentifierSet;
use exn::ResultExt;
use std::path::Path;

/// Raw first-column values, in file order. Blank values are kept; they are
/// dropped when the set is built.
pub fn read_identifiers(path: &Path, has_header: bool) -> Result<Vec<String>> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_path(path)
        .or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
        if let Some(value) = record.get(0) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Reads, normalizes and limits the identifier list. A list with nothing left
/// to process is an error.
pub fn load_identifiers(path: &Path, has_header: bool, limit: Option<usize>) -> Result<IdentifierSet> {
    let raw = read_identifiers(path, has_header)?;
    let identifiers = IdentifierSet::from_raw(&raw).limit(limit);
    if identifiers.is_empty() {
        exn::bail!(ErrorKind::NoIdentifiers(path.to_path_buf()));
    }
    tracing::info!(path = %path.display(), rows = raw.len(), identifiers = identifiers.len(), "Loaded identifiers");
    Ok(identifiers)
}
