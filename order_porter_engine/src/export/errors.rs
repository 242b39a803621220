use std::path::Path;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("Could not write {path}: {reason}")]
    FileWriteError { path: String, reason: String },
    #[error("Could not read {path}: {reason}")]
    FileReadError { path: String, reason: String },
    #[error("Invalid CSV data: {0}")]
    CsvError(String),
    #[error("Invalid snapshot pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl ExportError {
    pub fn write<P: AsRef<Path>, E: ToString>(path: P, e: E) -> Self {
        Self::FileWriteError { path: path.as_ref().display().to_string(), reason: e.to_string() }
    }

    pub fn read<P: AsRef<Path>, E: ToString>(path: P, e: E) -> Self {
        Self::FileReadError { path: path.as_ref().display().to_string(), reason: e.to_string() }
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        Self::CsvError(e.to_string())
    }
}
