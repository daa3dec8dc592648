//! Rule definitions

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Confidence assigned when a source value cannot be coerced to a number
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Canonical rule entity
///
/// Created once by the normalizer from raw input and never mutated afterwards.
/// The condition is kept as source text; it is compiled separately so that a
/// rule with a broken condition still appears in results with a zeroed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name (non-empty; uniqueness is recommended but not enforced)
    pub name: String,

    /// Condition expression source
    pub condition: String,

    /// Natural language explanation
    pub explanation: Option<String>,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Optional severity
    pub severity: Option<Severity>,

    /// Suggested remediation
    pub remediation: Option<String>,
}

impl Rule {
    /// Create a new rule with default confidence
    pub fn new(name: impl Into<String>, condition: impl Into<String>) -> Self {
        Rule {
            name: name.into(),
            condition: condition.into(),
            explanation: None,
            confidence: DEFAULT_CONFIDENCE,
            severity: None,
            remediation: None,
        }
    }

    /// Set the explanation
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Set the confidence, clamped to [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence, DEFAULT_CONFIDENCE);
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the remediation
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }
}

/// Clamp a confidence value into [0, 1], substituting `fallback` for NaN
pub fn clamp_confidence(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback.clamp(0.0, 1.0)
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Rule severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            _ => Err(CoreError::InvalidValue(format!("unknown severity '{}'", s.trim()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_creation() {
        let rule = Rule::new("high_cpu", "df['cpu'] > 0.85");

        assert_eq!(rule.name, "high_cpu");
        assert_eq!(rule.condition, "df['cpu'] > 0.85");
        assert_eq!(rule.confidence, DEFAULT_CONFIDENCE);
        assert!(rule.explanation.is_none());
        assert!(rule.severity.is_none());
        assert!(rule.remediation.is_none());
    }

    #[test]
    fn test_rule_builder() {
        let rule = Rule::new("lock_storm", "df['lock_waits'].diff() > 100")
            .with_explanation("Lock waits jump sharply")
            .with_confidence(0.9)
            .with_severity(Severity::High)
            .with_remediation("Inspect long-running transactions");

        assert_eq!(rule.explanation.as_deref(), Some("Lock waits jump sharply"));
        assert_eq!(rule.confidence, 0.9);
        assert_eq!(rule.severity, Some(Severity::High));
        assert!(rule.remediation.is_some());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Rule::new("a", "b").with_confidence(1.7).confidence, 1.0);
        assert_eq!(Rule::new("a", "b").with_confidence(-3.0).confidence, 0.0);
        assert_eq!(Rule::new("a", "b").with_confidence(f64::NAN).confidence, 0.5);
    }

    #[test]
    fn test_severity_parsing() {
        assert_eq!("high".parse::<Severity>(), Ok(Severity::High));
        assert_eq!(" Medium ".parse::<Severity>(), Ok(Severity::Medium));
        assert_eq!("LOW".parse::<Severity>(), Ok(Severity::Low));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn test_rule_serde_json() {
        let rule = Rule::new("r1", "df['cpu'] > 1").with_severity(Severity::Low);
        let json = serde_json::to_value(&rule).unwrap();

        assert_eq!(json["name"], "r1");
        assert_eq!(json["severity"], "LOW");
        assert_eq!(json["explanation"], serde_json::Value::Null);
        assert_eq!(json["confidence"], 0.5);

        let back: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }
}
