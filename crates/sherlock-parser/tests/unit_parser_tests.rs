//! Parser and normalizer tests through the public API
//!
//! Covers condition parsing end to end and the three raw rule shapes,
//! including malformed oracle output.

use serde_json::json;
use sherlock_core::ast::{Expression, Operator, TimeSeriesOp};
use sherlock_core::DiagnosticKind;
use sherlock_parser::*;

// =============================================================================
// Condition Parser Tests
// =============================================================================

#[test]
fn test_parse_oracle_style_condition() {
    let condition = "(df['cpu_usage'] > 0.8) & (df['latency_ms'].rolling(5).mean() > 250)";
    let expr = parse_condition(condition).unwrap();

    let Expression::Binary { op, left, right } = &expr else {
        panic!("expected binary expression, got {:?}", expr);
    };
    assert_eq!(*op, Operator::And);
    assert_eq!(
        **left,
        Expression::binary(Expression::column("cpu_usage"), Operator::Gt, Expression::literal(0.8))
    );
    assert!(matches!(
        **right,
        Expression::Binary {
            op: Operator::Gt,
            ..
        }
    ));
    assert_eq!(
        expr.columns().into_iter().collect::<Vec<_>>(),
        vec!["cpu_usage", "latency_ms"]
    );
}

#[test]
fn test_parse_bare_identifier_condition() {
    let expr = parse_condition("missing_col > 0").unwrap();
    assert_eq!(
        expr,
        Expression::binary(
            Expression::column("missing_col"),
            Operator::Gt,
            Expression::literal(0.0)
        )
    );
}

#[test]
fn test_parse_scientific_literals() {
    let expr = parse_condition("df['io_wait'] >= 1.5e-3").unwrap();
    assert_eq!(
        expr,
        Expression::binary(Expression::column("io_wait"), Operator::Ge, Expression::literal(0.0015))
    );
}

#[test]
fn test_parse_nested_time_series() {
    let expr = parse_condition("df['tps'].rolling(10).std().diff() < 0").unwrap();
    let Expression::Binary { left, .. } = expr else {
        panic!("expected comparison");
    };
    let Expression::TimeSeries { op, operand } = *left else {
        panic!("expected time-series node");
    };
    assert_eq!(op, TimeSeriesOp::Diff);
    assert!(matches!(
        *operand,
        Expression::TimeSeries {
            op: TimeSeriesOp::RollingStd { window: 10 },
            ..
        }
    ));
}

#[test]
fn test_injection_attempts_are_rejected() {
    let attempts = [
        "__import__('os').system('rm -rf /')",
        "df['cpu'].apply(lambda x: x)",
        "eval('1') > 0",
        "df['cpu'] > 0; import os",
        "df.__class__ > 0",
    ];
    for attempt in attempts {
        assert!(parse_condition(attempt).is_err(), "accepted: {}", attempt);
    }
}

#[test]
fn test_parse_error_reports_first_bad_token() {
    let err = parse_condition("df['cpu'] > > 1").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::SyntaxError);
    assert_eq!(err.position, 12);
    assert!(err.to_string().starts_with("Syntax error at position 12"));
}

#[test]
fn test_parser_is_reusable() {
    let parser = ExpressionParser::new();
    let a = parser.parse("x > 1").unwrap();
    let b = parser.parse("x > 1").unwrap();
    assert_eq!(a, b);
    assert_eq!(parser.table_alias(), "df");
}

// =============================================================================
// Rule Normalizer Tests
// =============================================================================

#[test]
fn test_normalize_structured_mixed_quality() {
    let payload = RawRulePayload::Structured(vec![
        json!({
            "name": "cpu_saturation",
            "condition": "df['cpu'] > 0.85",
            "explanation": "CPU pinned",
            "confidence": "0.9",
            "severity": "HIGH"
        }),
        json!({"name": "no_condition"}),
        json!(42),
        json!({"name": "io", "condition": "df['io'] > 3", "confidence": null}),
    ]);

    let result = RuleNormalizer::new().normalize(&payload);

    assert_eq!(result.rules.len(), 2);
    assert_eq!(result.skipped, 2);
    assert_eq!(result.diagnostics.len(), 2);
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::Normalization));
    assert_eq!(result.rules[0].confidence, 0.9);
    assert_eq!(result.rules[1].name, "io");
    assert_eq!(result.rules[1].confidence, 0.5);
}

#[test]
fn test_normalize_preserves_input_order() {
    let payload = RawRulePayload::Positional(vec![
        json!(["c", "x > 3", 0.3]),
        json!(["a", "x > 1", 0.1]),
        json!(["b", "x > 2", 0.2]),
    ]);
    let names: Vec<_> = RuleNormalizer::new()
        .normalize(&payload)
        .rules
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn test_normalize_oracle_prose_with_rules() {
    let response = r#"
Based on the metrics summary, I suggest the following rules.

Rule: lock_contention
Condition: df['lock_wait'].rolling(3).mean() > 50
Explanation: Sustained lock waits indicate contention
Confidence: 0.85

Rule: memory_leak
Condition: df['mem_used'].diff() > 100
Confidence: high

Rule: incomplete
Explanation: this one has no condition
"#;
    let result = RuleNormalizer::new().normalize(&RawRulePayload::Text(response.to_string()));

    assert_eq!(result.format, PayloadFormat::FreeText);
    assert_eq!(result.rules.len(), 2);
    assert_eq!(result.rules[0].name, "lock_contention");
    assert_eq!(
        result.rules[0].explanation.as_deref(),
        Some("Sustained lock waits indicate contention")
    );
    assert_eq!(result.rules[0].confidence, 0.85);
    assert_eq!(result.rules[1].confidence, 0.5);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].context, "text record[2] 'incomplete'");
}

#[test]
fn test_normalize_empty_payloads() {
    let normalizer = RuleNormalizer::new();
    for payload in [
        RawRulePayload::Structured(vec![]),
        RawRulePayload::Positional(vec![]),
        RawRulePayload::Text(String::new()),
    ] {
        assert!(payload.is_empty());
        let result = normalizer.normalize(&payload);
        assert!(result.rules.is_empty());
        assert!(result.diagnostics.is_empty());
    }
}

#[test]
fn test_strict_normalizer_on_oracle_json() {
    let text = r#"[{"name": "a", "condition": "x > 1"}, {"name": "b", "condition": "x > 2", "explanation": "e", "confidence": 0.4}]"#;
    let result = RuleNormalizer::new().with_strict(true).normalize_text(text);
    assert_eq!(result.rules.len(), 1);
    assert_eq!(result.rules[0].name, "b");
    assert_eq!(
        result.diagnostics[0].message,
        "Missing required field: explanation"
    );
}
