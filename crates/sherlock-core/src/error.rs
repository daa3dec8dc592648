//! Error types for Sherlock Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Violations of the metrics table invariants.
///
/// `InconsistentColumns`, `LengthMismatch` and `DuplicateColumn` are hard
/// failures: no per-row recovery is meaningful once rows disagree about
/// their columns. `Empty` is only ever reported as a diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error(
        "Row {row} has inconsistent columns (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    InconsistentColumns {
        row: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Column '{column}' has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{0}' is defined more than once")]
    DuplicateColumn(String),

    #[error("Metrics table has no rows")]
    Empty,
}

pub type Result<T> = std::result::Result<T, CoreError>;
