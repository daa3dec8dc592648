//! Column-length intermediate vectors

/// Value of one evaluation node, aligned to the table's rows
///
/// Numeric entries are `None` where the value is undefined: the first rows
/// of a time-series operator, NaN input, or a division by zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Numeric(Vec<Option<f64>>),
    Boolean(Vec<bool>),
}

impl Series {
    /// Wrap raw column values; NaN becomes undefined
    pub fn from_values(values: &[f64]) -> Self {
        Series::Numeric(values.iter().map(|v| defined(*v)).collect())
    }

    /// Broadcast a scalar to `len` rows
    pub fn constant(value: f64, len: usize) -> Self {
        Series::Numeric(vec![defined(value); len])
    }

    pub fn len(&self) -> usize {
        match self {
            Series::Numeric(values) => values.len(),
            Series::Boolean(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `"numeric"` or `"boolean"`
    pub fn type_name(&self) -> &'static str {
        match self {
            Series::Numeric(_) => "numeric",
            Series::Boolean(_) => "boolean",
        }
    }
}

/// `Some` for finite values
pub(crate) fn defined(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_marks_nan_undefined() {
        let series = Series::from_values(&[1.0, f64::NAN, 3.0]);
        assert_eq!(series, Series::Numeric(vec![Some(1.0), None, Some(3.0)]));
        assert_eq!(series.type_name(), "numeric");
    }

    #[test]
    fn test_constant() {
        assert_eq!(Series::constant(2.0, 3), Series::Numeric(vec![Some(2.0); 3]));
        assert!(Series::constant(2.0, 0).is_empty());
    }
}
