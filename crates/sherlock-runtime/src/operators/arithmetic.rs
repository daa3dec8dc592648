//! Arithmetic operator execution

use crate::series::defined;
use sherlock_core::ast::Operator;

/// Apply `+ - * /` element-wise. Undefined operands, division by zero and
/// overflow yield undefined entries.
pub(crate) fn execute_arithmetic(
    left: &[Option<f64>],
    op: Operator,
    right: &[Option<f64>],
) -> Vec<Option<f64>> {
    left.iter()
        .zip(right)
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => apply(*l, op, *r),
            _ => None,
        })
        .collect()
}

fn apply(l: f64, op: Operator, r: f64) -> Option<f64> {
    let value = match op {
        Operator::Add => l + r,
        Operator::Sub => l - r,
        Operator::Mul => l * r,
        Operator::Div if r == 0.0 => return None,
        Operator::Div => l / r,
        _ => return None,
    };
    defined(value)
}

pub(crate) fn negate(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values.iter().map(|v| v.map(|v| -v)).collect()
}
