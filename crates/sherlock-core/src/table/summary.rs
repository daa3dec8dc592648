//! Descriptive statistics over a metrics table

use super::MetricsTable;
use serde::Serialize;
use std::fmt::Write;

const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Statistics for a single column
///
/// Non-finite values are excluded. Statistics of a column without finite
/// values are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Per-column summary of a metrics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub row_count: usize,
    pub columns: Vec<ColumnSummary>,
}

impl ColumnSummary {
    fn from_values(name: &str, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            sorted.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let variance =
                sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        };

        ColumnSummary {
            name: name.to_string(),
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }

    fn stats(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.p25,
            self.p50,
            self.p75,
            self.max,
        ]
    }
}

/// Linear interpolation between closest ranks; `sorted` must be ascending
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

impl TableSummary {
    /// Summarize every column of `table`
    pub fn of(table: &MetricsTable) -> Self {
        TableSummary {
            row_count: table.row_count(),
            columns: table
                .columns()
                .map(|(name, values)| ColumnSummary::from_values(name, values))
                .collect(),
        }
    }

    /// Look up a column summary by name
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Render as an aligned text table, one row per statistic and one
    /// column per metric
    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| c.name.len().max(12))
            .collect();

        let mut out = String::new();
        let _ = write!(out, "{:<6}", "");
        for (column, width) in self.columns.iter().zip(&widths) {
            let _ = write!(out, " {:>width$}", column.name, width = *width);
        }
        out.push('\n');

        let stats: Vec<[f64; 8]> = self.columns.iter().map(ColumnSummary::stats).collect();
        for (row, label) in STAT_LABELS.iter().enumerate() {
            let _ = write!(out, "{:<6}", label);
            for (values, width) in stats.iter().zip(&widths) {
                let _ = write!(out, " {:>width$.6}", values[row], width = *width);
            }
            out.push('\n');
        }

        out
    }
}

impl MetricsTable {
    /// Descriptive statistics for every column
    pub fn summary(&self) -> TableSummary {
        TableSummary::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_summary() {
        let table =
            MetricsTable::from_columns(vec![("cpu", vec![0.1, 0.2, 0.9, 0.95, 0.3])]).unwrap();
        let summary = table.summary();

        assert_eq!(summary.row_count, 5);
        let cpu = summary.column("cpu").unwrap();
        assert_eq!(cpu.count, 5);
        assert!((cpu.mean - 0.49).abs() < 1e-12);
        assert_eq!(cpu.min, 0.1);
        assert_eq!(cpu.max, 0.95);
        assert!((cpu.p50 - 0.3).abs() < 1e-12);
        assert!((cpu.p25 - 0.2).abs() < 1e-12);
        assert!((cpu.p75 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let table = MetricsTable::from_columns(vec![("x", values)]).unwrap();
        let x = table.summary().columns[0].clone();
        // Population std is 2.0; sample std is sqrt(32/7)
        assert!((x.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_values_are_excluded() {
        let table = MetricsTable::from_columns(vec![("x", vec![1.0, f64::NAN, 3.0])]).unwrap();
        let x = table.summary().columns[0].clone();
        assert_eq!(x.count, 2);
        assert_eq!(x.mean, 2.0);
    }

    #[test]
    fn test_render_contains_labels_and_columns() {
        let table = MetricsTable::from_columns(vec![
            ("cpu", vec![0.1, 0.2]),
            ("lock_waits", vec![3.0, 4.0]),
        ])
        .unwrap();

        let text = table.summary().render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 9);
        assert!(lines[0].contains("cpu"));
        assert!(lines[0].contains("lock_waits"));
        assert!(lines[1].starts_with("count"));
        assert!(lines[8].starts_with("max"));
        assert!(lines[8].contains("4.000000"));
    }
}
