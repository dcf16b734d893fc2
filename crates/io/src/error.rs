use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    /// Required input file missing. Aborts the run before any computation.
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("cannot read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },
    /// Malformed delimited data (unbalanced quotes, ragged rows, etc.).
    #[error("table '{table}': {message}")]
    Csv { table: String, message: String },
    /// Required header column absent.
    #[error("table '{table}': missing column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error("table '{table}', row {row}, column '{column}': cannot parse number '{value}'")]
    NumberParse {
        table: String,
        row: usize,
        column: String,
        value: String,
    },
    #[error("cannot write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}
