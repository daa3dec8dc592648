//! Key/value record normalization

use super::coerce::{non_empty, scalar_to_f64, scalar_to_string, type_name};
use super::RuleNormalizer;
use crate::error::NormalizationError;
use log::debug;
use serde_json::{Map, Value};
use sherlock_core::ast::{clamp_confidence, Rule, Severity};

type Record = Map<String, Value>;

/// Normalize one structured element into a rule
pub(crate) fn normalize_record(
    value: &Value,
    normalizer: &RuleNormalizer,
) -> Result<Rule, NormalizationError> {
    let Value::Object(record) = value else {
        return Err(NormalizationError::MalformedRecord(format!(
            "expected an object, found {}",
            type_name(value)
        )));
    };

    let name = required_name(record)?;
    let condition = required_condition(record)?;

    if normalizer.strict {
        for field in ["explanation", "confidence"] {
            if present(record, field).is_none() {
                return Err(NormalizationError::missing(field));
            }
        }
    }

    let mut rule = Rule::new(name, condition);
    rule.confidence = confidence(record, normalizer.default_confidence);
    rule.explanation = present(record, "explanation")
        .and_then(scalar_to_string)
        .and_then(|s| non_empty(&s));
    rule.severity = severity(record);
    rule.remediation = remediation(record);

    Ok(rule)
}

/// Field value, treating an explicit null as absent
fn present<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

fn required_name(record: &Record) -> Result<String, NormalizationError> {
    let value = present(record, "name").ok_or_else(|| NormalizationError::missing("name"))?;
    let name = scalar_to_string(value).ok_or_else(|| {
        NormalizationError::invalid(
            "name",
            format!("expected a string, found {}", type_name(value)),
        )
    })?;
    non_empty(&name).ok_or_else(|| NormalizationError::missing("name"))
}

fn required_condition(record: &Record) -> Result<String, NormalizationError> {
    let value =
        present(record, "condition").ok_or_else(|| NormalizationError::missing("condition"))?;
    let Value::String(condition) = value else {
        return Err(NormalizationError::invalid(
            "condition",
            format!("expected a string, found {}", type_name(value)),
        ));
    };
    non_empty(condition).ok_or_else(|| NormalizationError::missing("condition"))
}

fn confidence(record: &Record, default: f64) -> f64 {
    match present(record, "confidence") {
        None => default,
        Some(value) => match scalar_to_f64(value) {
            Some(v) => clamp_confidence(v, default),
            None => {
                debug!("Unparsable confidence {}, using default {}", value, default);
                default
            }
        },
    }
}

fn severity(record: &Record) -> Option<Severity> {
    let value = present(record, "severity")?;
    let text = scalar_to_string(value)?;
    match text.parse::<Severity>() {
        Ok(severity) => Some(severity),
        Err(e) => {
            debug!("Ignoring severity: {}", e);
            None
        }
    }
}

/// Remediation may be a single string or a list of steps
fn remediation(record: &Record) -> Option<String> {
    match present(record, "remediation")? {
        Value::Array(steps) => {
            let steps: Vec<String> = steps
                .iter()
                .filter_map(scalar_to_string)
                .filter_map(|s| non_empty(&s))
                .collect();
            if steps.is_empty() {
                None
            } else {
                Some(steps.join("\n"))
            }
        }
        other => scalar_to_string(other).and_then(|s| non_empty(&s)),
    }
}
