//! Legacy positional tuples: `(name, condition, confidence, ...)`

use super::coerce::{non_empty, scalar_to_f64, scalar_to_string, type_name};
use crate::error::NormalizationError;
use log::debug;
use serde_json::Value;
use sherlock_core::ast::{clamp_confidence, Rule};

const NAME: usize = 0;
const CONDITION: usize = 1;
const CONFIDENCE: usize = 2;

/// Normalize one tuple. Absent or null elements read as `""` / `0.0`;
/// elements past the third are ignored.
pub(crate) fn normalize_tuple(
    value: &Value,
    default_confidence: f64,
) -> Result<Rule, NormalizationError> {
    let Value::Array(items) = value else {
        return Err(NormalizationError::MalformedTuple(format!(
            "expected an array, found {}",
            type_name(value)
        )));
    };

    let name = string_element(items, NAME, "name")?;
    let condition = string_element(items, CONDITION, "condition")?;
    let confidence = confidence_element(items, default_confidence)?;

    let name = non_empty(&name).ok_or_else(|| NormalizationError::missing("name"))?;
    let condition = non_empty(&condition).ok_or_else(|| NormalizationError::missing("condition"))?;

    Ok(Rule::new(name, condition).with_confidence(confidence))
}

fn string_element(
    items: &[Value],
    index: usize,
    field: &str,
) -> Result<String, NormalizationError> {
    match items.get(index) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(value) => scalar_to_string(value).ok_or_else(|| {
            NormalizationError::MalformedTuple(format!(
                "element {} ({}) must be a scalar, found {}",
                index,
                field,
                type_name(value)
            ))
        }),
    }
}

fn confidence_element(items: &[Value], default: f64) -> Result<f64, NormalizationError> {
    match items.get(CONFIDENCE) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value @ (Value::Array(_) | Value::Object(_))) => {
            Err(NormalizationError::MalformedTuple(format!(
                "element {} (confidence) must be a scalar, found {}",
                CONFIDENCE,
                type_name(value)
            )))
        }
        Some(value) => Ok(match scalar_to_f64(value) {
            Some(v) => clamp_confidence(v, default),
            None => {
                debug!("Unparsable tuple confidence {}, using default {}", value, default);
                default
            }
        }),
    }
}
