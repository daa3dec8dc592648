//! Sherlock Core - Core types and definitions for the Sherlock rule engine
//!
//! This crate provides the fundamental types used across the Sherlock workspace:
//! - Rule definitions and severity levels
//! - Condition AST (Abstract Syntax Tree) definitions
//! - The columnar metrics table rules are evaluated against
//! - Diagnostics returned alongside results
//! - Error types

pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod table;

// Re-export commonly used types
pub use ast::{
    clamp_confidence, Expression, Operator, Rule, Severity, TimeSeriesOp, UnaryOperator,
    DEFAULT_CONFIDENCE, DEFAULT_TABLE_ALIAS,
};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{CoreError, TableError};
pub use table::{ColumnSummary, MetricsTable, TableSummary};
