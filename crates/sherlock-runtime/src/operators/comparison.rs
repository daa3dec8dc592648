//! Comparison operator execution

use sherlock_core::ast::Operator;

/// Compare numeric vectors element-wise.
///
/// An undefined operand on either side compares as `false`, so warm-up rows
/// of time-series operators never fire.
pub(crate) fn compare_numeric(
    left: &[Option<f64>],
    op: Operator,
    right: &[Option<f64>],
) -> Vec<bool> {
    left.iter()
        .zip(right)
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => compare(*l, op, *r),
            _ => false,
        })
        .collect()
}

fn compare(l: f64, op: Operator, r: f64) -> bool {
    match op {
        Operator::Eq => l == r,
        Operator::Ne => l != r,
        Operator::Gt => l > r,
        Operator::Ge => l >= r,
        Operator::Lt => l < r,
        Operator::Le => l <= r,
        _ => false,
    }
}

/// `==` / `!=` over boolean vectors. `None` for any other operator.
pub(crate) fn compare_boolean(left: &[bool], op: Operator, right: &[bool]) -> Option<Vec<bool>> {
    let equal = match op {
        Operator::Eq => true,
        Operator::Ne => false,
        _ => return None,
    };
    Some(
        left.iter()
            .zip(right)
            .map(|(l, r)| (l == r) == equal)
            .collect(),
    )
}
