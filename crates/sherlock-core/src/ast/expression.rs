//! Condition expression AST nodes

use super::operator::Operator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Table alias used when rendering column references back to source.
pub const DEFAULT_TABLE_ALIAS: &str = "df";

/// Condition expression AST node
///
/// Column references are not resolved here: whether a column exists is only
/// known once a table is supplied to the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Column reference (e.g., `df['cpu']` or the shorthand `cpu`)
    Column(String),

    /// Numeric literal
    Literal(f64),

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// Binary operation
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },

    /// Time-series operator applied to a column or another time-series expression
    /// (e.g., `df['cpu'].diff()`, `df['cpu'].rolling(5).mean()`)
    TimeSeries {
        op: TimeSeriesOp,
        operand: Box<Expression>,
    },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Logical NOT (`not`, `!`, `~`)
    Not,
    /// Arithmetic negation (-)
    Negate,
}

/// Time-series operators, closed over this fixed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeSeriesOp {
    /// First difference: `value[i] - value[i-1]`
    Diff,
    /// Trailing simple moving average over `window` rows
    RollingMean { window: usize },
    /// Trailing sample standard deviation over `window` rows
    RollingStd { window: usize },
}

impl TimeSeriesOp {
    /// Operator name as written in conditions
    pub fn kind(&self) -> &'static str {
        match self {
            TimeSeriesOp::Diff => "diff",
            TimeSeriesOp::RollingMean { .. } => "rolling_mean",
            TimeSeriesOp::RollingStd { .. } => "rolling_std",
        }
    }

    /// Window size for rolling operators
    pub fn window(&self) -> Option<usize> {
        match self {
            TimeSeriesOp::Diff => None,
            TimeSeriesOp::RollingMean { window } | TimeSeriesOp::RollingStd { window } => {
                Some(*window)
            }
        }
    }

    /// Number of leading rows for which this operator has no defined value
    pub fn warmup(&self) -> usize {
        match self {
            TimeSeriesOp::Diff => 1,
            TimeSeriesOp::RollingMean { window } | TimeSeriesOp::RollingStd { window } => {
                window.saturating_sub(1)
            }
        }
    }
}

impl Expression {
    /// Create a column reference
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(name.into())
    }

    /// Create a numeric literal
    pub fn literal(value: f64) -> Self {
        Expression::Literal(value)
    }

    /// Create a binary expression
    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a time-series expression
    pub fn time_series(op: TimeSeriesOp, operand: Expression) -> Self {
        Expression::TimeSeries {
            op,
            operand: Box::new(operand),
        }
    }

    /// Names of all columns referenced by this expression, sorted
    pub fn columns(&self) -> BTreeSet<&str> {
        let mut result = BTreeSet::new();
        self.collect_columns(&mut result);
        result
    }

    fn collect_columns<'a>(&'a self, result: &mut BTreeSet<&'a str>) {
        match self {
            Expression::Column(name) => {
                result.insert(name.as_str());
            }
            Expression::Literal(_) => {}
            Expression::Unary { operand, .. } | Expression::TimeSeries { operand, .. } => {
                operand.collect_columns(result)
            }
            Expression::Binary { left, right, .. } => {
                left.collect_columns(result);
                right.collect_columns(result);
            }
        }
    }

    /// Height of the tree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            Expression::Column(_) | Expression::Literal(_) => 1,
            Expression::Unary { operand, .. } | Expression::TimeSeries { operand, .. } => {
                operand.depth() + 1
            }
            Expression::Binary { left, right, .. } => left.depth().max(right.depth()) + 1,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Binary { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

/// Renders the expression in the condition language, parenthesizing every
/// nested binary operation.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(name) => {
                if name.contains('\'') {
                    write!(f, "{}[\"{}\"]", DEFAULT_TABLE_ALIAS, name)
                } else {
                    write!(f, "{}['{}']", DEFAULT_TABLE_ALIAS, name)
                }
            }
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Unary { op, operand } => {
                match op {
                    UnaryOperator::Not => f.write_str("not ")?,
                    UnaryOperator::Negate => f.write_str("-")?,
                }
                operand.fmt_operand(f)
            }
            Expression::Binary { left, op, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
            Expression::TimeSeries { op, operand } => {
                operand.fmt_operand(f)?;
                match op {
                    TimeSeriesOp::Diff => f.write_str(".diff()"),
                    TimeSeriesOp::RollingMean { window } => {
                        write!(f, ".rolling({}).mean()", window)
                    }
                    TimeSeriesOp::RollingStd { window } => write!(f, ".rolling({}).std()", window),
                }
            }
        }
    }
}
