//! Sherlock Parser - condition parsing and rule normalization
//!
//! This crate turns untrusted input into Sherlock core types:
//! - Condition strings into `Expression` trees over a closed grammar
//! - Structured records, free-text oracle output and legacy positional
//!   tuples into canonical `Rule`s

pub mod error;
pub mod expression_parser;
mod lexer;
pub mod normalizer;

// Re-export main parser types
pub use error::{NormalizationError, ParseError, ParseErrorKind, Result};
pub use expression_parser::{parse_condition, ExpressionParser};
pub use normalizer::{NormalizedRules, PayloadFormat, RawRulePayload, RuleNormalizer};
