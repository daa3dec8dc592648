//! Line-oriented free-text rule protocol
//!
//! ```text
//! Rule: cpu_spike
//! Condition: df['cpu'] > 0.85
//! Explanation: CPU saturation
//! Confidence: 0.8
//! ```
//!
//! `Rule:` starts a new record; the other keywords fill in the current one.
//! Keywords are case-sensitive and must open the (trimmed) line. Any other
//! line is ignored.

use super::coerce::non_empty;
use crate::error::NormalizationError;
use log::debug;
use sherlock_core::ast::{clamp_confidence, Rule};

const RULE: &str = "Rule:";
const CONDITION: &str = "Condition:";
const EXPLANATION: &str = "Explanation:";
const CONFIDENCE: &str = "Confidence:";

/// One record as written in the text, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TextRecord {
    pub name: Option<String>,
    pub condition: Option<String>,
    pub explanation: Option<String>,
    /// Raw text after `Confidence:`
    pub confidence: Option<String>,
}

impl TextRecord {
    fn is_empty(&self) -> bool {
        self == &TextRecord::default()
    }

    /// Validate into a rule. Unparsable confidence falls back to `default_confidence`.
    pub(crate) fn into_rule(self, default_confidence: f64) -> Result<Rule, NormalizationError> {
        let name = self
            .name
            .and_then(|n| non_empty(&n))
            .ok_or_else(|| NormalizationError::missing("name"))?;
        let condition = self
            .condition
            .and_then(|c| non_empty(&c))
            .ok_or_else(|| NormalizationError::missing("condition"))?;

        let confidence = match self.confidence {
            None => default_confidence,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) => clamp_confidence(v, default_confidence),
                Err(_) => {
                    debug!("Unparsable confidence '{}' for rule '{}'", raw, name);
                    default_confidence
                }
            },
        };

        let mut rule = Rule::new(name, condition);
        rule.confidence = confidence;
        rule.explanation = self.explanation.and_then(|e| non_empty(&e));
        Ok(rule)
    }
}

/// Split free text into records
pub(crate) fn parse_records(text: &str) -> Vec<TextRecord> {
    let mut records = Vec::new();
    let mut current = TextRecord::default();

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(RULE) {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            current.name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(CONDITION) {
            current.condition = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(EXPLANATION) {
            current.explanation = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(CONFIDENCE) {
            current.confidence = Some(rest.trim().to_string());
        }
    }

    if !current.is_empty() {
        records.push(current);
    }
    records
}
