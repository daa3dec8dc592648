//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use sherlock_sdk::{MetricsTable, RawRulePayload};
use std::sync::Arc;

/// Test helper to build a metrics table column by column
pub struct TestTable {
    columns: Vec<(String, Vec<f64>)>,
}

impl TestTable {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Add a column
    pub fn with_column(mut self, name: &str, values: &[f64]) -> Self {
        self.columns.push((name.to_string(), values.to_vec()));
        self
    }

    pub fn build(self) -> MetricsTable {
        MetricsTable::from_columns(self.columns).expect("test table must be rectangular")
    }

    pub fn shared(self) -> Arc<MetricsTable> {
        Arc::new(self.build())
    }
}

/// Five-row table used across the SDK tests
pub fn cpu_table() -> MetricsTable {
    TestTable::new()
        .with_column("cpu", &[0.1, 0.2, 0.9, 0.95, 0.3])
        .build()
}

/// Database-style metrics with a slow memory climb and a latency burst
pub fn db_metrics() -> MetricsTable {
    TestTable::new()
        .with_column("cpu", &[0.1, 0.2, 0.9, 0.95, 0.3, 0.25, 0.2, 0.85])
        .with_column("latency_ms", &[10.0, 12.0, 30.0, 55.0, 11.0, 10.0, 9.0, 40.0])
        .with_column("mem_used", &[100.0, 110.0, 125.0, 180.0, 181.0, 182.0, 183.0, 240.0])
        .with_column("lock_wait", &[0.0, 0.0, 5.0, 8.0, 0.0, 0.0, 0.0, 3.0])
        .build()
}

/// Structured record
pub fn record(name: &str, condition: &str) -> Value {
    json!({
        "name": name,
        "condition": condition,
        "explanation": format!("{} fired", name),
        "confidence": 0.8,
    })
}

/// Legacy positional tuples
pub fn legacy_payload() -> RawRulePayload {
    RawRulePayload::Positional(vec![
        json!(["cpu_high", "df['cpu'] > 0.8", 0.9]),
        json!(["latency_burst", "df['latency_ms'].rolling(2).mean() > 25", 0.7]),
        json!(["mem_growth", "df['mem_used'].diff() > 50", 0.6]),
    ])
}
