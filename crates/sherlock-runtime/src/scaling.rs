//! Column standardization
//!
//! Optional preprocessing that rescales every column to zero mean and unit
//! population variance before conditions are evaluated.

use sherlock_core::{MetricsTable, TableError};

/// Mean and scale of one column
///
/// Only finite values contribute. A constant (or empty) column gets scale 1,
/// so it standardizes to zeros instead of dividing by zero.
pub fn column_scale(values: &[f64]) -> (f64, f64) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return (0.0, 1.0);
    }

    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };
    (mean, scale)
}

/// Z-score every column. NaN entries stay NaN.
pub fn standardize(table: &MetricsTable) -> Result<MetricsTable, TableError> {
    table.map_columns(|name, values| {
        let (mean, scale) = column_scale(values);
        tracing::trace!("Standardizing '{}' with mean {} and scale {}", name, mean, scale);
        values.iter().map(|v| (v - mean) / scale).collect()
    })
}
