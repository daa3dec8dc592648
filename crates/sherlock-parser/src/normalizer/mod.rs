//! Rule normalizer
//!
//! Converts the three incoming rule shapes into canonical [`Rule`]s:
//! - structured key/value records
//! - free text, either JSON emitted by an oracle or the `Rule:` line protocol
//! - legacy positional tuples
//!
//! Normalization never fails as a whole. Every element that cannot be turned
//! into a rule is skipped and reported as a [`Diagnostic`].

mod coerce;
mod free_text;
mod positional;
mod structured;

use crate::error::NormalizationError;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sherlock_core::ast::{clamp_confidence, Rule, DEFAULT_CONFIDENCE};
use sherlock_core::Diagnostic;

/// Raw rules as delivered by an external producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "payload", rename_all = "snake_case")]
pub enum RawRulePayload {
    /// Key/value records; non-object elements are skipped
    Structured(Vec<Value>),
    /// One text block, JSON or the line protocol
    Text(String),
    /// Fixed-arity tuples; non-array elements are skipped
    Positional(Vec<Value>),
}

impl RawRulePayload {
    /// Classify an arbitrary JSON value.
    ///
    /// Arrays whose first element is itself an array are positional, other
    /// arrays are structured. `{"rules": [...]}` unwraps to its list, any
    /// other object is a single structured record and a string is text.
    pub fn from_json_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                if matches!(items.first(), Some(Value::Array(_))) {
                    RawRulePayload::Positional(items)
                } else {
                    RawRulePayload::Structured(items)
                }
            }
            Value::Object(mut map) => match map.remove("rules") {
                Some(Value::Array(items)) => RawRulePayload::Structured(items),
                Some(other) => {
                    map.insert("rules".to_string(), other);
                    RawRulePayload::Structured(vec![Value::Object(map)])
                }
                None => RawRulePayload::Structured(vec![Value::Object(map)]),
            },
            Value::String(text) => RawRulePayload::Text(text),
            other => RawRulePayload::Text(other.to_string()),
        }
    }

    /// Number of raw elements, counting a text block as one
    pub fn len(&self) -> usize {
        match self {
            RawRulePayload::Structured(items) | RawRulePayload::Positional(items) => items.len(),
            RawRulePayload::Text(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawRulePayload::Structured(items) | RawRulePayload::Positional(items) => {
                items.is_empty()
            }
            RawRulePayload::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Shape that was actually normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    Structured,
    FreeText,
    Positional,
}

/// Normalizer output: validated rules plus what was dropped
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRules {
    pub rules: Vec<Rule>,
    pub diagnostics: Vec<Diagnostic>,
    pub skipped: usize,
    pub format: PayloadFormat,
}

impl NormalizedRules {
    fn new(format: PayloadFormat) -> Self {
        NormalizedRules {
            rules: Vec::new(),
            diagnostics: Vec::new(),
            skipped: 0,
            format,
        }
    }

    fn accept(&mut self, context: String, result: Result<Rule, NormalizationError>) {
        match result {
            Ok(rule) => self.rules.push(rule),
            Err(error) => {
                debug!("Skipping {}: {}", context, error);
                self.diagnostics
                    .push(Diagnostic::normalization(context, error.to_string()));
                self.skipped += 1;
            }
        }
    }
}

/// Converts raw payloads into canonical rules
#[derive(Debug, Clone)]
pub struct RuleNormalizer {
    default_confidence: f64,
    strict: bool,
}

impl Default for RuleNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleNormalizer {
    pub fn new() -> Self {
        RuleNormalizer {
            default_confidence: DEFAULT_CONFIDENCE,
            strict: false,
        }
    }

    /// Confidence used when a value is present but unparsable
    pub fn with_default_confidence(mut self, confidence: f64) -> Self {
        self.default_confidence = clamp_confidence(confidence, DEFAULT_CONFIDENCE);
        self
    }

    /// Require `explanation` and `confidence` on structured records
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn default_confidence(&self) -> f64 {
        self.default_confidence
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Normalize any payload shape
    pub fn normalize(&self, payload: &RawRulePayload) -> NormalizedRules {
        let normalized = match payload {
            RawRulePayload::Structured(records) => self.normalize_structured(records),
            RawRulePayload::Text(text) => self.normalize_text(text),
            RawRulePayload::Positional(tuples) => self.normalize_positional(tuples),
        };
        debug!(
            "Normalized {:?} payload: {} rules, {} skipped",
            normalized.format,
            normalized.rules.len(),
            normalized.skipped
        );
        normalized
    }

    /// A payload made only of strings is not structured data at all and is
    /// read as one free-text block instead.
    pub fn normalize_structured(&self, records: &[Value]) -> NormalizedRules {
        if !records.is_empty() && records.iter().all(Value::is_string) {
            debug!("Structured payload holds only text, reading it as free text");
            let text = records
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            return self.normalize_text(&text);
        }

        let mut out = NormalizedRules::new(PayloadFormat::Structured);
        for (index, record) in records.iter().enumerate() {
            let context = match record.get("name").and_then(Value::as_str) {
                Some(name) => format!("record[{}] '{}'", index, name),
                None => format!("record[{}]", index),
            };
            out.accept(context, structured::normalize_record(record, self));
        }
        out
    }

    /// Text is decoded as JSON rules when possible (fenced or bare),
    /// otherwise read with the line protocol.
    pub fn normalize_text(&self, text: &str) -> NormalizedRules {
        if let Some(records) = decode_json_rules(text) {
            return self.normalize_structured(&records);
        }

        let mut out = NormalizedRules::new(PayloadFormat::FreeText);
        for (index, record) in free_text::parse_records(text).into_iter().enumerate() {
            let context = match record.name.as_deref().filter(|n| !n.is_empty()) {
                Some(name) => format!("text record[{}] '{}'", index, name),
                None => format!("text record[{}]", index),
            };
            out.accept(context, record.into_rule(self.default_confidence));
        }
        out
    }

    pub fn normalize_positional(&self, tuples: &[Value]) -> NormalizedRules {
        let mut out = NormalizedRules::new(PayloadFormat::Positional);
        for (index, tuple) in tuples.iter().enumerate() {
            out.accept(
                format!("tuple[{}]", index),
                positional::normalize_tuple(tuple, self.default_confidence),
            );
        }
        out
    }
}

/// Decode oracle output as a JSON rule list.
///
/// Accepts a top-level array, `{"rules": [...]}` or a single rule object,
/// optionally wrapped in a markdown code fence. `None` means the text is
/// not structured and should be read line by line.
fn decode_json_rules(text: &str) -> Option<Vec<Value>> {
    let candidate = fenced_block(text).unwrap_or(text).trim();
    if !(candidate.starts_with('[') || candidate.starts_with('{')) {
        return None;
    }

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => Some(items),
        Ok(Value::Object(mut map)) => match map.remove("rules") {
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                map.insert("rules".to_string(), other);
                Some(vec![Value::Object(map)])
            }
            None => Some(vec![Value::Object(map)]),
        },
        Ok(_) => None,
        Err(e) => {
            debug!("Oracle output is not JSON ({}), using line protocol", e);
            None
        }
    }
}

/// Body of the first ```-fenced block, without the info string
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sherlock_core::DiagnosticKind;

    #[test]
    fn test_structured_one_good_one_missing_condition() {
        let payload = RawRulePayload::Structured(vec![
            json!({"name": "cpu", "condition": "df['cpu'] > 0.85", "confidence": 0.8}),
            json!({"name": "broken", "explanation": "no condition"}),
        ]);
        let result = RuleNormalizer::new().normalize(&payload);

        assert_eq!(result.format, PayloadFormat::Structured);
        assert_eq!(result.rules.len(), 1);
        assert_eq!(result.rules[0].name, "cpu");
        assert_eq!(result.skipped, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Normalization);
        assert_eq!(result.diagnostics[0].context, "record[1] 'broken'");
        assert_eq!(
            result.diagnostics[0].message,
            "Missing required field: condition"
        );
    }

    #[test]
    fn test_structured_text_only_falls_back_to_free_text() {
        let payload = RawRulePayload::Structured(vec![
            json!("Rule: spill"),
            json!("Condition: df['temp_spill'] > 0"),
            json!("Confidence: 0.6"),
        ]);
        let result = RuleNormalizer::new().normalize(&payload);

        assert_eq!(result.format, PayloadFormat::FreeText);
        assert_eq!(result.rules.len(), 1);
        assert_eq!(result.rules[0].name, "spill");
        assert_eq!(result.rules[0].confidence, 0.6);
    }

    #[test]
    fn test_free_text_payload() {
        let payload = RawRulePayload::Text("Rule: R1\nCondition: x > 1\nConfidence: bad\n".into());
        let result = RuleNormalizer::new().normalize(&payload);

        assert_eq!(result.format, PayloadFormat::FreeText);
        assert_eq!(result.rules.len(), 1);
        assert_eq!(result.rules[0].name, "R1");
        assert_eq!(result.rules[0].condition, "x > 1");
        assert_eq!(result.rules[0].confidence, 0.5);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_text_json_array() {
        let text = r#"[{"name": "a", "condition": "x > 1", "explanation": "e", "confidence": 0.9}]"#;
        let result = RuleNormalizer::new().normalize_text(text);
        assert_eq!(result.format, PayloadFormat::Structured);
        assert_eq!(result.rules.len(), 1);
        assert_eq!(result.rules[0].confidence, 0.9);
    }

    #[test]
    fn test_text_fenced_json_object() {
        let text = "Sure, here are the enhanced rules:\n```json\n{\"rules\": [\n  {\"name\": \"a\", \"condition\": \"x > 1\"},\n  {\"name\": \"b\"}\n]}\n```\nLet me know!";
        let result = RuleNormalizer::new().normalize_text(text);
        assert_eq!(result.format, PayloadFormat::Structured);
        assert_eq!(result.rules.len(), 1);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_invalid_json_falls_back_to_line_protocol() {
        let text = "[not json\nRule: a\nCondition: x > 1";
        let result = RuleNormalizer::new().normalize_text(text);
        assert_eq!(result.format, PayloadFormat::FreeText);
        assert_eq!(result.rules.len(), 1);
        assert_eq!(result.rules[0].name, "a");
    }

    #[test]
    fn test_free_text_missing_condition_diagnostic() {
        let text = "Rule: a\nExplanation: nothing to check\nRule: b\nCondition: y < 2";
        let result = RuleNormalizer::new().normalize_text(text);
        assert_eq!(result.rules.len(), 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].context, "text record[0] 'a'");
    }

    #[test]
    fn test_positional_payload() {
        let payload = RawRulePayload::Positional(vec![
            json!(["r1", "df['cpu'] > 0.9", 0.7]),
            json!("not a tuple"),
            json!(["r3", "df['io'] > 3"]),
        ]);
        let result = RuleNormalizer::new().normalize(&payload);
        assert_eq!(result.format, PayloadFormat::Positional);
        assert_eq!(result.rules.len(), 2);
        assert_eq!(result.rules[1].confidence, 0.0);
        assert_eq!(result.diagnostics[0].context, "tuple[1]");
    }

    #[test]
    fn test_custom_default_confidence() {
        let normalizer = RuleNormalizer::new().with_default_confidence(0.3);
        let result = normalizer.normalize_text("Rule: a\nCondition: x > 1\nConfidence: ?");
        assert_eq!(result.rules[0].confidence, 0.3);
    }

    #[test]
    fn test_from_json_value() {
        assert!(matches!(
            RawRulePayload::from_json_value(json!([["a", "x > 1", 0.5]])),
            RawRulePayload::Positional(_)
        ));
        assert!(matches!(
            RawRulePayload::from_json_value(json!([{"name": "a"}])),
            RawRulePayload::Structured(_)
        ));
        assert_eq!(
            RawRulePayload::from_json_value(json!({"rules": [{"name": "a"}, {"name": "b"}]})).len(),
            2
        );
        assert!(matches!(
            RawRulePayload::from_json_value(json!("Rule: a")),
            RawRulePayload::Text(_)
        ));
    }

    #[test]
    fn test_payload_serde_shape() {
        let payload: RawRulePayload =
            serde_json::from_value(json!({"format": "text", "payload": "Rule: a"})).unwrap();
        assert_eq!(payload, RawRulePayload::Text("Rule: a".to_string()));
    }

    #[test]
    fn test_fenced_block() {
        assert_eq!(fenced_block("```json\n[1]\n```"), Some("[1]\n"));
        assert_eq!(fenced_block("no fence"), None);
        assert_eq!(fenced_block("```\n[2]"), Some("[2]"));
    }
}
