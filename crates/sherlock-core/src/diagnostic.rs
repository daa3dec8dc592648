//! Diagnostics returned alongside results
//!
//! A diagnostic records a skipped input element or a failed rule. Diagnostics
//! never abort processing; they are data for the host to log or display.

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A raw rule record could not be normalized and was skipped
    Normalization,
    /// A rule condition failed to parse
    Parse,
    /// A rule condition failed to evaluate
    Evaluation,
    /// The metrics table has no rows, so every score is zero
    EmptyTable,
}

/// Non-fatal `(context, message)` record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Where the problem occurred: a rule name or a record locator such as `record[2]`
    pub context: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            kind,
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn normalization(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Normalization, context, message)
    }

    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Parse, context, message)
    }

    pub fn evaluation(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Evaluation, context, message)
    }

    pub fn empty_table() -> Self {
        Self::new(
            DiagnosticKind::EmptyTable,
            "table",
            format!("{}; all scores are zero", TableError::Empty),
        )
    }

    /// The `(context, message)` pair
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.context, &self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.context, self.message)
    }
}
