use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot read record store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record at {path}:{line}: {source}")]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record at {path}:{line} is not a JSON object")]
    NotAnObject { path: PathBuf, line: usize },
}

/// Failures that abort report generation. File-based sources never produce
/// one; only the record store can.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Record store unavailable: {0}")]
    Store(#[from] StoreError),
}
