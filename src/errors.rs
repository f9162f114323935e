//! Error types for the phishing campaign report generator.
//!
//! Every failure the tool can hit maps to one variant here, and every
//! variant maps to a non-zero process exit status.

use std::path::PathBuf;

use crate::models::TableError;

/// The main error type for report generation.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Wrong number of command-line arguments
    #[error("expected exactly two arguments: <result.csv> <report.html>")]
    Usage,

    /// Input CSV does not exist or is not a regular file
    #[error("CSV file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Input is not a well-formed delimited table
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Input parsed as CSV but does not form a valid table
    #[error("Failed to parse {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    /// Chart could not be rasterized or encoded
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Output file could not be written
    #[error("Failed to write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error outside of the output write
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ReportError
pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for the given input file
    pub fn parse(source: csv::Error, path: impl Into<PathBuf>) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Create a table-shape error for the given input file
    pub fn table(source: TableError, path: impl Into<PathBuf>) -> Self {
        Self::Table {
            path: path.into(),
            source,
        }
    }

    /// Create a write error for the given destination
    pub fn write(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a chart error from any displayable backend failure
    pub fn chart(message: impl std::fmt::Display) -> Self {
        Self::Chart(message.to_string())
    }

    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage | Self::FileNotFound { .. } => 1,
            Self::Parse { .. } | Self::Table { .. } => 2,
            Self::Chart(_) | Self::Json(_) => 3,
            Self::Write { .. } | Self::Io { .. } => 4,
        }
    }
}
