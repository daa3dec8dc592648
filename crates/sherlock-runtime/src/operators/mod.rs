//! Element-wise operator kernels
//!
//! Every kernel takes column-length vectors and returns a new vector of the
//! same length. Inputs are never modified.

mod arithmetic;
mod comparison;
mod logical;
mod window;

pub(crate) use arithmetic::{execute_arithmetic, negate};
pub(crate) use comparison::{compare_boolean, compare_numeric};
pub(crate) use logical::{execute_logical, not};
pub(crate) use window::execute_time_series;
