use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of a single analyzer run.
///
/// Unmatched log lines and empty inputs are not errors; they only shrink
/// the record set.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("could not open log file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed reading '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write CSV report '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write console report: {0}")]
    Console(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
