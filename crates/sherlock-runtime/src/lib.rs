//! Sherlock Runtime - condition evaluation and scoring
//!
//! Evaluates parsed conditions against a `MetricsTable`, producing one
//! boolean per row, and scores the resulting masks.

pub mod error;
pub mod evaluator;
mod operators;
pub mod scaling;
pub mod scorer;
pub mod series;

pub use error::{EvalError, Result};
pub use evaluator::{evaluate, Evaluator};
pub use scaling::standardize;
pub use scorer::{EffectivenessScore, Scorer};
pub use series::Series;
