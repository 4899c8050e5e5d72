//! Input validation errors. Any of these aborts a batch before the first remote call.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// Input file could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CSV structure error (unbalanced quotes, ragged row, invalid UTF-8)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Header lacks required columns
    #[error("Missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// A row or line has an unusable value
    #[error("Line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    /// Same email twice in one import file
    #[error("Line {line}: duplicate email '{email}' (first seen on line {first_line})")]
    DuplicateEmail {
        email: String,
        line: u64,
        first_line: u64,
    },

    /// Nothing to process
    #[error("No {0} provided")]
    Empty(&'static str),
}

impl ValidationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert a CSV error, keeping its line number when it has one
    pub(crate) fn from_csv(err: csv::Error) -> Self {
        match err.position().map(|p| p.line()) {
            Some(line) if !matches!(err.kind(), csv::ErrorKind::Io(_)) => Self::InvalidRow {
                line,
                message: err.to_string(),
            },
            _ => Self::Csv(err),
        }
    }
}
