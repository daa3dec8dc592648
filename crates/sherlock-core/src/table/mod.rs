//! Columnar metrics table
//!
//! - `MetricsTable`: time-ordered rows of named floating point columns
//! - `TableSummary`: per-column descriptive statistics

mod metrics_table;
mod summary;

pub use metrics_table::MetricsTable;
pub use summary::{ColumnSummary, TableSummary};
