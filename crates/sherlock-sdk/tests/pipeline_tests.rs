//! Rule set pipeline integration tests
//!
//! End-to-end runs from raw payloads to scored reports.

mod common;

use common::*;
use serde_json::json;
use sherlock_sdk::*;
use std::collections::HashMap;
use std::sync::Arc;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_cpu_threshold_end_to_end() {
    let payload = RawRulePayload::Structured(vec![
        record("cpu_spike", "df['cpu'] > 0.85"),
        record("cpu_spike_short", "cpu > 0.85"),
    ]);
    let report = RuleSetPipeline::new().run(&payload, &cpu_table());

    assert_eq!(report.len(), 2);
    assert!(report.diagnostics.is_empty());
    for result in &report.results {
        assert!(approx(result.score.precision, 0.4));
        assert!(approx(result.score.recall, 0.4));
        assert!(approx(result.score.f1, 0.4));
    }
}

#[test]
fn test_f1_extremes() {
    let payload = RawRulePayload::Structured(vec![
        record("always", "cpu > 0"),
        record("never", "cpu > 5"),
    ]);
    let report = RuleSetPipeline::new().run(&payload, &cpu_table());

    let always = report.get("always").unwrap().score;
    assert_eq!((always.precision, always.recall, always.f1), (1.0, 1.0, 1.0));
    assert!(report.get("never").unwrap().score.is_zero());
}

#[test]
fn test_legacy_tuples_scored_in_order() {
    let report = RuleSetPipeline::new().run(&legacy_payload(), &db_metrics());

    let names: Vec<_> = report.rules().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["cpu_high", "latency_burst", "mem_growth"]);
    assert!(approx(report.results[0].score.precision, 0.375));
    assert!(approx(report.results[1].score.precision, 0.25));
    assert!(approx(report.results[2].score.precision, 0.25));
    assert_eq!(report.results[0].rule.confidence, 0.9);
}

#[test]
fn test_warmup_rows_do_not_count() {
    let payload = RawRulePayload::Structured(vec![
        record("diff_any", "df['mem_used'].diff() > -1000"),
        record("rolling_any", "df['latency_ms'].rolling(4).mean() > -1000"),
    ]);
    let report = RuleSetPipeline::new().run(&payload, &db_metrics());

    assert!(approx(report.results[0].score.precision, 7.0 / 8.0));
    assert!(approx(report.results[1].score.precision, 5.0 / 8.0));
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_structured_record_missing_condition() {
    let payload = RawRulePayload::Structured(vec![
        record("ok", "cpu > 0.5"),
        json!({"name": "broken", "explanation": "no condition"}),
    ]);
    let report = RuleSetPipeline::new().run(&payload, &cpu_table());

    assert_eq!(report.len(), 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Normalization);
}

#[test]
fn test_free_text_confidence_fallback() {
    let table = TestTable::new().with_column("x", &[0.0, 2.0, 3.0, 0.5]).build();
    let payload = RawRulePayload::Text("Rule: R1\nCondition: x > 1\nConfidence: bad\n".to_string());

    let report = RuleSetPipeline::new().run(&payload, &table);

    assert_eq!(report.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.rule.name, "R1");
    assert_eq!(result.rule.condition, "x > 1");
    assert_eq!(result.rule.confidence, 0.5);
    assert!(approx(result.score.precision, 0.5));
}

#[test]
fn test_unknown_column_does_not_stop_batch() {
    let payload = RawRulePayload::Structured(vec![
        record("first", "cpu > 0.85"),
        record("missing", "missing_col > 0"),
        record("last", "cpu < 0.85"),
    ]);
    let report = RuleSetPipeline::new().run(&payload, &cpu_table());

    assert_eq!(report.len(), 3);
    assert!(report.get("missing").unwrap().score.is_zero());
    assert!(approx(report.get("last").unwrap().score.precision, 0.6));
    assert_eq!(
        report.diagnostic_pairs(),
        vec![("missing", "Unknown column: missing_col")]
    );
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Evaluation);
}

#[test]
fn test_unsafe_condition_is_parse_diagnostic() {
    let payload = RawRulePayload::Structured(vec![
        record("evil", "__import__('os').system('id')"),
        record("fine", "cpu > 0.85"),
    ]);
    let report = RuleSetPipeline::new().run(&payload, &cpu_table());

    assert!(report.get("evil").unwrap().score.is_zero());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Parse);
    assert_eq!(report.diagnostics[0].context, "evil");
    assert!(!report.get("fine").unwrap().score.is_zero());
}

#[test]
fn test_empty_table() {
    let table = TestTable::new().with_column("cpu", &[]).build();
    let report = RuleSetPipeline::new().run(&legacy_payload(), &table);

    assert_eq!(report.row_count, 0);
    assert!(report.results.iter().all(|r| r.score.is_zero()));
    assert_eq!(report.diagnostics[0], Diagnostic::empty_table());
}

#[test]
fn test_inconsistent_rows_are_fatal() {
    let rows = vec![
        HashMap::from([("cpu".to_string(), 0.1), ("mem".to_string(), 1.0)]),
        HashMap::from([("cpu".to_string(), 0.2)]),
    ];
    let err = RuleSetPipeline::new()
        .run_rows(&legacy_payload(), rows)
        .unwrap_err();
    assert!(matches!(err, SdkError::TableError(_)));
}

#[test]
fn test_run_rows() {
    let rows = [0.1, 0.2, 0.9, 0.95, 0.3]
        .into_iter()
        .map(|cpu| HashMap::from([("cpu".to_string(), cpu)]));
    let payload = RawRulePayload::Structured(vec![record("cpu_spike", "cpu > 0.85")]);

    let report = RuleSetPipeline::new().run_rows(&payload, rows).unwrap();
    assert!(approx(report.results[0].score.f1, 0.4));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_yaml_config() {
    let config = PipelineConfig::from_yaml_str(
        r#"
table_alias: metrics
scaling: zscore
parallel: true
"#,
    )
    .unwrap();
    assert_eq!(config.default_confidence, 0.5);

    let pipeline = RuleSetPipeline::with_config(config).unwrap();
    let payload = RawRulePayload::Structured(vec![
        record("above_mean", "metrics['cpu'] > 0"),
        record("wrong_alias", "df['cpu'] > 0"),
    ]);
    let report = pipeline.run(&payload, &cpu_table());

    assert!(approx(report.results[0].score.precision, 0.4));
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].context, "wrong_alias");
}

#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.yaml");
    std::fs::write(&path, "default_confidence: 0.25\nstrict_structured: true\n").unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();
    let pipeline = RuleSetPipeline::with_config(config).unwrap();

    let payload = RawRulePayload::Structured(vec![
        json!({"name": "loose", "condition": "cpu > 0.5"}),
        record("complete", "cpu > 0.5"),
    ]);
    let report = pipeline.run(&payload, &cpu_table());
    assert_eq!(report.len(), 1);
    assert_eq!(report.results[0].rule.name, "complete");
}

#[test]
fn test_invalid_yaml_config() {
    assert!(matches!(
        PipelineConfig::from_yaml_str("default_confidence: 2.0"),
        Err(SdkError::ConfigError(_))
    ));
    assert!(matches!(
        PipelineConfig::from_yaml_str("scaling: minmax"),
        Err(SdkError::YamlError(_))
    ));
}

// =============================================================================
// Compilation and concurrency
// =============================================================================

#[test]
fn test_compiled_set_reused_across_tables() {
    let pipeline = RuleSetPipeline::new();
    let normalized = pipeline.normalize(&legacy_payload());
    let compiled = pipeline.compile(normalized.rules);

    let first = compiled.evaluate(&db_metrics());
    let second = compiled.evaluate(&db_metrics());
    assert_eq!(first, second);

    let small = TestTable::new()
        .with_column("cpu", &[0.9, 0.1])
        .with_column("latency_ms", &[1.0, 2.0])
        .with_column("mem_used", &[1.0, 100.0])
        .build();
    let report = compiled.evaluate(&small);
    assert!(approx(report.results[0].score.precision, 0.5));
    assert!(approx(report.results[2].score.precision, 0.5));
}

#[tokio::test]
async fn test_concurrent_preserves_order() {
    let payload = RawRulePayload::Structured(
        (0..32)
            .map(|i| record(&format!("rule_{}", i), &format!("df['mem_used'] > {}", 100 + i * 5)))
            .collect(),
    );
    let table = Arc::new(db_metrics());
    let pipeline = RuleSetPipeline::new();

    let concurrent = pipeline.run_concurrent(&payload, Arc::clone(&table)).await;
    let sequential = pipeline.run(&payload, &table);

    let names: Vec<_> = concurrent.rules().map(|r| r.name.clone()).collect();
    let expected: Vec<_> = (0..32).map(|i| format!("rule_{}", i)).collect();
    assert_eq!(names, expected);
    assert_eq!(concurrent, sequential);
}

#[tokio::test]
async fn test_run_configured_parallel() {
    let config = PipelineConfig::new().with_parallel(true);
    let pipeline = RuleSetPipeline::with_config(config).unwrap();
    let table = TestTable::new().with_column("cpu", &[]).shared();

    let report = pipeline.run_configured(&legacy_payload(), table).await;
    assert_eq!(report.len(), 3);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::EmptyTable);
}

#[test]
fn test_report_json_is_flat() {
    let payload = RawRulePayload::Structured(vec![record("cpu_spike", "cpu > 0.85")]);
    let report = RuleSetPipeline::new().run(&payload, &cpu_table());

    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let result = &value["results"][0];
    assert_eq!(result["name"], "cpu_spike");
    assert_eq!(result["condition"], "cpu > 0.85");
    assert_eq!(result["precision"], 0.4);
    assert!(result["f1"].is_f64());
    assert_eq!(value["row_count"], 5);
}
