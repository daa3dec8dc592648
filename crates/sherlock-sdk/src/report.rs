//! Pipeline results

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sherlock_core::{Diagnostic, Rule};
use sherlock_runtime::EffectivenessScore;
use std::collections::BTreeMap;

/// One rule with its score, serialized as a flat record:
/// `name, condition, explanation, confidence, severity, remediation,
/// precision, recall, f1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    #[serde(flatten)]
    pub rule: Rule,
    #[serde(flatten)]
    pub score: EffectivenessScore,
}

/// Output of one pipeline run
///
/// `results` follows the order of the normalized rules. Every rule is
/// present, failed ones with a zero score and a matching diagnostic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    pub results: Vec<RuleResult>,
    pub diagnostics: Vec<Diagnostic>,
    /// Raw elements dropped during normalization
    pub skipped: usize,
    /// Rows in the evaluated table
    pub row_count: usize,
}

impl PipelineReport {
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, result: RuleResult, diagnostic: Option<Diagnostic>) {
        self.results.push(result);
        self.diagnostics.extend(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Find a result by rule name (first match)
    pub fn get(&self, name: &str) -> Option<&RuleResult> {
        self.results.iter().find(|r| r.rule.name == name)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.results.iter().map(|r| &r.rule)
    }

    /// Diagnostics as `(context, message)` pairs
    pub fn diagnostic_pairs(&self) -> Vec<(&str, &str)> {
        self.diagnostics.iter().map(Diagnostic::as_pair).collect()
    }

    /// Scores keyed by rule name. A later rule with a duplicate name wins.
    pub fn metrics_by_name(&self) -> BTreeMap<String, EffectivenessScore> {
        self.results
            .iter()
            .map(|r| (r.rule.name.clone(), r.score))
            .collect()
    }

    pub fn into_pairs(self) -> Vec<(Rule, EffectivenessScore)> {
        self.results.into_iter().map(|r| (r.rule, r.score)).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
