use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("input file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A cell that does not hold the expected number or percentage.
    /// `row` is the 1-based data row, header excluded.
    #[error("bad value {value:?} in column '{column}' (row {row}): {reason}")]
    Format {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("missing required column: {column}")]
    MissingColumn { column: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReportError::MissingColumn { .. } | ReportError::Validation(_)
        )
    }
}

impl From<std::fmt::Error> for ReportError {
    fn from(e: std::fmt::Error) -> Self {
        ReportError::Render(e.to_string())
    }
}
