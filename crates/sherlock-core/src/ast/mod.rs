//! Abstract Syntax Tree (AST) definitions for Sherlock
//!
//! This module contains:
//! - Condition expressions compiled from rule condition strings
//! - Operators used by those expressions
//! - The canonical rule entity

pub mod expression;
pub mod operator;
pub mod rule;

pub use expression::{Expression, TimeSeriesOp, UnaryOperator, DEFAULT_TABLE_ALIAS};
pub use operator::Operator;
pub use rule::{clamp_confidence, Rule, Severity, DEFAULT_CONFIDENCE};
