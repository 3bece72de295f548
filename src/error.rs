use derive_more::{Display, Error};
use std::process::ExitCode;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("invalid input")]
    Input,
    #[display("could not create report")]
    Report,
    /// The report failed after moves had started.
    #[display("could not write report")]
    ReportWrite,
    #[display("could not inspect quarantine")]
    Quarantine,
}

impl ErrorKind {
    /// Failures once moves have begun are distinguished from those before.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::ReportWrite => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}
