//! Evaluation error types

use thiserror::Error;

/// Condition evaluation error
///
/// Scoped to a single rule; the pipeline turns these into diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Column referenced by the condition is absent from the table
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Boolean and numeric operands mixed
    #[error("Type mismatch in '{op}': expected {expected}, found {found}")]
    TypeMismatch {
        op: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Rolling window of zero rows
    #[error("Invalid rolling window: {0}")]
    InvalidWindow(usize),
}

impl EvalError {
    pub(crate) fn type_mismatch(
        op: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        EvalError::TypeMismatch {
            op: op.into(),
            expected,
            found,
        }
    }
}

/// Result type for evaluation
pub type Result<T> = std::result::Result<T, EvalError>;
