//! Logical operator execution

use sherlock_core::ast::Operator;

/// `and` / `or` element-wise. `None` for a non-logical operator.
pub(crate) fn execute_logical(left: &[bool], op: Operator, right: &[bool]) -> Option<Vec<bool>> {
    let combine: fn(bool, bool) -> bool = match op {
        Operator::And => |l, r| l && r,
        Operator::Or => |l, r| l || r,
        _ => return None,
    };
    Some(left.iter().zip(right).map(|(l, r)| combine(*l, *r)).collect())
}

pub(crate) fn not(values: &[bool]) -> Vec<bool> {
    values.iter().map(|v| !v).collect()
}
