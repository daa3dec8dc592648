//! Expression evaluator
//!
//! Post-order walk over an `Expression`, producing a column-length `Series`
//! at every node. The table is only read.

use crate::error::{EvalError, Result};
use crate::operators::{
    compare_boolean, compare_numeric, execute_arithmetic, execute_logical, execute_time_series,
    negate, not,
};
use crate::series::Series;
use sherlock_core::ast::{Expression, Operator, UnaryOperator};
use sherlock_core::MetricsTable;

const NUMERIC: &str = "numeric";
const BOOLEAN: &str = "boolean";

/// Evaluates conditions against one table
pub struct Evaluator<'a> {
    table: &'a MetricsTable,
}

impl<'a> Evaluator<'a> {
    pub fn new(table: &'a MetricsTable) -> Self {
        Self { table }
    }

    /// Evaluate a condition into a row mask
    pub fn evaluate(&self, expression: &Expression) -> Result<Vec<bool>> {
        match self.eval(expression)? {
            Series::Boolean(mask) => {
                tracing::trace!(
                    "Evaluated {} over {} rows: {} hits",
                    expression,
                    mask.len(),
                    mask.iter().filter(|hit| **hit).count()
                );
                Ok(mask)
            }
            Series::Numeric(_) => Err(EvalError::type_mismatch("condition", BOOLEAN, NUMERIC)),
        }
    }

    /// Evaluate any node, including numeric ones
    pub fn eval(&self, expression: &Expression) -> Result<Series> {
        match expression {
            Expression::Column(name) => self
                .table
                .column(name)
                .map(Series::from_values)
                .ok_or_else(|| EvalError::UnknownColumn(name.clone())),

            Expression::Literal(value) => Ok(Series::constant(*value, self.table.row_count())),

            Expression::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                match (op, operand) {
                    (UnaryOperator::Not, Series::Boolean(values)) => {
                        Ok(Series::Boolean(not(&values)))
                    }
                    (UnaryOperator::Negate, Series::Numeric(values)) => {
                        Ok(Series::Numeric(negate(&values)))
                    }
                    (UnaryOperator::Not, other) => {
                        Err(EvalError::type_mismatch("not", BOOLEAN, other.type_name()))
                    }
                    (UnaryOperator::Negate, other) => {
                        Err(EvalError::type_mismatch("-", NUMERIC, other.type_name()))
                    }
                }
            }

            Expression::Binary { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.eval_binary(left, *op, right)
            }

            Expression::TimeSeries { op, operand } => match self.eval(operand)? {
                Series::Numeric(values) => Ok(Series::Numeric(execute_time_series(*op, &values)?)),
                Series::Boolean(_) => Err(EvalError::type_mismatch(op.kind(), NUMERIC, BOOLEAN)),
            },
        }
    }

    fn eval_binary(&self, left: Series, op: Operator, right: Series) -> Result<Series> {
        let symbol = op.symbol();

        if op.is_arithmetic() {
            return match (left, right) {
                (Series::Numeric(l), Series::Numeric(r)) => {
                    Ok(Series::Numeric(execute_arithmetic(&l, op, &r)))
                }
                (l, r) => Err(EvalError::type_mismatch(
                    symbol,
                    NUMERIC,
                    mismatched(&l, &r, NUMERIC),
                )),
            };
        }

        if op.is_comparison() {
            return match (left, right) {
                (Series::Numeric(l), Series::Numeric(r)) => {
                    Ok(Series::Boolean(compare_numeric(&l, op, &r)))
                }
                (Series::Boolean(l), Series::Boolean(r)) => compare_boolean(&l, op, &r)
                    .map(Series::Boolean)
                    .ok_or_else(|| EvalError::type_mismatch(symbol, NUMERIC, BOOLEAN)),
                (l, r) => Err(EvalError::type_mismatch(symbol, l.type_name(), r.type_name())),
            };
        }

        match (left, right) {
            (Series::Boolean(l), Series::Boolean(r)) => execute_logical(&l, op, &r)
                .map(Series::Boolean)
                .ok_or_else(|| EvalError::type_mismatch(symbol, BOOLEAN, BOOLEAN)),
            (l, r) => Err(EvalError::type_mismatch(symbol, BOOLEAN, mismatched(&l, &r, BOOLEAN))),
        }
    }
}

/// Type name of whichever operand is not `expected`
fn mismatched(left: &Series, right: &Series, expected: &'static str) -> &'static str {
    if left.type_name() != expected {
        left.type_name()
    } else {
        right.type_name()
    }
}

/// Evaluate a condition against a table
pub fn evaluate(expression: &Expression, table: &MetricsTable) -> Result<Vec<bool>> {
    Evaluator::new(table).evaluate(expression)
}
