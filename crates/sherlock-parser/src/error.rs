//! Parser error types

use std::fmt;
use thiserror::Error;

/// Category of a condition parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Structurally invalid token sequence
    SyntaxError,
    /// Operator, method or function outside the supported set
    UnknownOperator,
    /// Malformed numeric literal or window size
    InvalidLiteral,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::SyntaxError => f.write_str("Syntax error"),
            ParseErrorKind::UnknownOperator => f.write_str("Unknown operator"),
            ParseErrorKind::InvalidLiteral => f.write_str("Invalid literal"),
        }
    }
}

/// Condition parse error
///
/// `position` is the byte offset of the first offending token in the
/// condition string.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at position {position}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            position,
            message: message.into(),
        }
    }

    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::SyntaxError, position, message)
    }

    pub fn unknown_operator(position: usize, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::UnknownOperator, position, message)
    }

    pub fn invalid_literal(position: usize, message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidLiteral, position, message)
    }
}

/// Result type for condition parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Why a single raw rule element was skipped
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Field present but unusable
    #[error("Invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// Positional tuple that cannot be coerced
    #[error("Malformed tuple: {0}")]
    MalformedTuple(String),

    /// Structured element that is not a key/value record
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

impl NormalizationError {
    pub fn missing(field: &str) -> Self {
        NormalizationError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        NormalizationError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
