//! Rule Enhancement Example
//!
//! Scores a set of legacy anomaly rules against synthetic database metrics,
//! asks a (mock) oracle for better rules and scores those too.
//!
//! Run with:
//!   cargo run -p sherlock-sdk --example enhance_rules [output.json]

use serde_json::json;
use sherlock_sdk::{
    EnhancementReport, MetricsTable, MockOracle, PipelineConfig, PipelineReport, RawRulePayload,
    RuleEnhancer,
};
use std::sync::Arc;

const ORACLE_RESPONSE: &str = r#"```json
[
  {
    "name": "cpu_saturation",
    "condition": "df['cpu_usage'] > 0.85 and df['active_sessions'] > 40",
    "explanation": "CPU is pinned while sessions pile up",
    "confidence": 0.9,
    "severity": "high",
    "remediation": ["Check for runaway queries", "Review connection pool limits"]
  },
  {
    "name": "lock_contention",
    "condition": "df['lock_wait_ms'].rolling(3).mean() > 20",
    "explanation": "Lock waits stay elevated across several samples",
    "confidence": 0.8,
    "severity": "medium"
  },
  {
    "name": "memory_growth",
    "condition": "df['memory_mb'].diff() > 200",
    "explanation": "Sudden memory growth between samples",
    "confidence": 0.6
  }
]
```"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sherlock_sdk=info".parse()?),
        )
        .init();

    println!("=== Rule Enhancement Example ===\n");

    let table = Arc::new(synthetic_metrics()?);
    println!("Metrics table: {} rows\n", table.row_count());
    println!("{}\n", table.summary().render());

    // Positional tuples as produced by the legacy analysis tool
    let legacy = RawRulePayload::Positional(vec![
        json!(["high_cpu", "df['cpu_usage'] > 0.8", 0.75]),
        json!(["slow_io", "df['io_wait'] > 0.3", 0.6]),
        json!(["session_spike", "df['active_sessions'].diff() > 15", "0.7"]),
        json!(["broken_tool_output", "df['cpu_usage'] >> 1", 0.5]),
    ]);

    let oracle = Arc::new(MockOracle::with_response(ORACLE_RESPONSE));
    let config = PipelineConfig::new().with_parallel(true);
    let enhancer = RuleEnhancer::with_config(oracle, config)?;

    let report = enhancer.enhance(Arc::clone(&table), &legacy).await?;

    print_report("Original Rules", &report.original);
    print_report("Enhanced Rules", &report.enhanced);
    print_comparison(&report);

    if let Some(path) = std::env::args().nth(1) {
        report.write_json(&path)?;
        println!("\nResults written to {}", path);
    }

    Ok(())
}

/// Sixty samples with a lock storm and a CPU/session burst
fn synthetic_metrics() -> anyhow::Result<MetricsTable> {
    let n = 60;
    let mut cpu = Vec::with_capacity(n);
    let mut sessions = Vec::with_capacity(n);
    let mut lock_wait = Vec::with_capacity(n);
    let mut io_wait = Vec::with_capacity(n);
    let mut memory = Vec::with_capacity(n);

    for i in 0..n {
        let t = i as f64;
        let burst = (35..45).contains(&i);
        let storm = (20..28).contains(&i);

        cpu.push(if burst { 0.92 } else { 0.35 + 0.1 * (t / 5.0).sin() });
        sessions.push(if burst { 55.0 } else { 20.0 + (t / 3.0).cos() * 4.0 });
        lock_wait.push(if storm { 35.0 } else { 2.0 + (t % 4.0) });
        io_wait.push(0.1 + 0.05 * (t / 7.0).sin() + if storm { 0.3 } else { 0.0 });
        memory.push(2048.0 + t * 5.0 + if i >= 50 { 400.0 } else { 0.0 });
    }

    Ok(MetricsTable::from_columns(vec![
        ("cpu_usage", cpu),
        ("active_sessions", sessions),
        ("lock_wait_ms", lock_wait),
        ("io_wait", io_wait),
        ("memory_mb", memory),
    ])?)
}

fn print_report(title: &str, report: &PipelineReport) {
    println!("=== {} ===", title);
    for result in &report.results {
        println!(
            "  {:<20} precision={:.3} recall={:.3} f1={:.3}  ({})",
            result.rule.name,
            result.score.precision,
            result.score.recall,
            result.score.f1,
            result.rule.condition
        );
    }
    for diagnostic in &report.diagnostics {
        println!("  ! {}", diagnostic);
    }
    println!();
}

fn print_comparison(report: &EnhancementReport) {
    let best = |r: &PipelineReport| {
        r.results
            .iter()
            .map(|result| result.score.f1)
            .fold(0.0_f64, f64::max)
    };

    println!("=== Comparison ===");
    println!(
        "  rules: {} original, {} enhanced",
        report.original.len(),
        report.enhanced.len()
    );
    println!(
        "  best f1: {:.3} original, {:.3} enhanced",
        best(&report.original),
        best(&report.enhanced)
    );
}
