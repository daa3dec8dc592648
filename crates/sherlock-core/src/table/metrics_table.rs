//! Metrics table storage

use crate::error::TableError;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Time-ordered table of numeric columns
///
/// Stored column-wise. Every column has exactly `row_count` values and row
/// order is the temporal order of the source; no operation reorders rows.
/// The table is immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsTable {
    columns: BTreeMap<String, Vec<f64>>,
    row_count: usize,
}

impl MetricsTable {
    /// Create a table with no rows and no columns
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from row mappings
    ///
    /// The first row fixes the column set; every later row must carry exactly
    /// the same columns.
    pub fn from_rows<I>(rows: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = HashMap<String, f64>>,
    {
        let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut row_count = 0;

        for (index, row) in rows.into_iter().enumerate() {
            if index == 0 {
                for name in row.keys() {
                    columns.insert(name.clone(), Vec::new());
                }
            } else if row.len() != columns.len()
                || !row.keys().all(|name| columns.contains_key(name))
            {
                return Err(Self::inconsistent_row(index, &columns, &row));
            }

            for (name, value) in row {
                if let Some(values) = columns.get_mut(&name) {
                    values.push(value);
                }
            }
            row_count += 1;
        }

        log::debug!(
            "Built metrics table with {} rows and {} columns",
            row_count,
            columns.len()
        );

        Ok(Self { columns, row_count })
    }

    /// Build a table from named columns of equal length
    pub fn from_columns<I, K>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<String>,
    {
        let mut table = BTreeMap::new();
        let mut row_count: Option<usize> = None;

        for (name, values) in columns {
            let name = name.into();
            match row_count {
                None => row_count = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(TableError::LengthMismatch {
                        column: name,
                        expected,
                        found: values.len(),
                    });
                }
                Some(_) => {}
            }
            match table.entry(name) {
                Entry::Occupied(entry) => {
                    return Err(TableError::DuplicateColumn(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(values);
                }
            }
        }

        Ok(Self {
            columns: table,
            row_count: row_count.unwrap_or(0),
        })
    }

    /// Apply `f` to every column, producing a new table with the same shape
    pub fn map_columns<F>(&self, mut f: F) -> Result<Self, TableError>
    where
        F: FnMut(&str, &[f64]) -> Vec<f64>,
    {
        let mapped = self
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), f(name, values)))
            .collect::<Vec<_>>();

        let table = Self::from_columns(mapped)?;
        if !self.columns.is_empty() && table.row_count != self.row_count {
            return Err(TableError::LengthMismatch {
                column: self.columns.keys().next().cloned().unwrap_or_default(),
                expected: self.row_count,
                found: table.row_count,
            });
        }

        Ok(Self {
            columns: table.columns,
            row_count: self.row_count,
        })
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Values of a column in row order
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in sorted order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Columns in sorted name order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    fn inconsistent_row(
        index: usize,
        columns: &BTreeMap<String, Vec<f64>>,
        row: &HashMap<String, f64>,
    ) -> TableError {
        let expected: BTreeSet<&String> = columns.keys().collect();
        let found: BTreeSet<&String> = row.keys().collect();

        TableError::InconsistentColumns {
            row: index,
            missing: expected.difference(&found).map(|s| s.to_string()).collect(),
            unexpected: found.difference(&expected).map(|s| s.to_string()).collect(),
        }
    }
}
