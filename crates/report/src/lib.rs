//! CSV input and output around a run.
//!
//! - [`ReportWriter`] streams outcomes into the audit report.
//! - [`load_resume`] turns an earlier report back into a
//!   [`ResumeRecord`](casemover_engine::ResumeRecord).
//! - [`load_identifiers`] reads the identifier list.

pub mod error;
mod identifiers;
mod reader;
mod summary;
mod writer;

pub use crate::identifiers::{load_identifiers, read_identifiers};
pub use crate::reader::{load_resume, read_prior_outcomes};
pub use crate::summary::render_summary;
pub use crate::writer::{
    COLUMNS, END_PARAMETERS, PARAMETER_STATUS, ReportWriter, config_parameters, format_timestamp,
};
