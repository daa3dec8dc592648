//! Rule effectiveness scoring
//!
//! Without labelled anomalies the scores are self-referential:
//! `precision = mean(mask)` and `recall = sum(mask) / row_count`. They are
//! kept in this exact form so results stay comparable across runs.

use serde::{Deserialize, Serialize};
use sherlock_core::MetricsTable;

/// Precision, recall and F1 of one rule on one table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectivenessScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl EffectivenessScore {
    /// Score reported for failed rules and empty tables
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a score, deriving F1 as the harmonic mean
    pub fn new(precision: f64, recall: f64) -> Self {
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.precision == 0.0 && self.recall == 0.0 && self.f1 == 0.0
    }
}

/// Scores evaluated masks
pub struct Scorer;

impl Scorer {
    /// Score a mask against the table it was evaluated on
    pub fn score(mask: &[bool], table: &MetricsTable) -> EffectivenessScore {
        Self::score_rows(mask, table.row_count())
    }

    /// Score a mask against a known row count
    ///
    /// An empty table, or a mask that does not cover every row, scores zero.
    pub fn score_rows(mask: &[bool], row_count: usize) -> EffectivenessScore {
        if row_count == 0 || mask.is_empty() {
            return EffectivenessScore::zero();
        }
        if mask.len() != row_count {
            tracing::warn!(
                "Mask length {} does not match row count {}, scoring zero",
                mask.len(),
                row_count
            );
            return EffectivenessScore::zero();
        }

        let hits = mask.iter().filter(|hit| **hit).count() as f64;
        let precision = hits / mask.len() as f64;
        let recall = hits / row_count as f64;
        EffectivenessScore::new(precision, recall)
    }
}
