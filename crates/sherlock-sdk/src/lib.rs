//! Sherlock SDK - rule set pipeline
//!
//! High-level entry points for ingesting anomaly rules from heterogeneous
//! producers, evaluating them against a metrics table and scoring them.
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sherlock_sdk::{MetricsTable, RawRulePayload, RuleSetPipeline};
//!
//! let table = MetricsTable::from_columns(vec![("cpu", vec![0.1, 0.2, 0.9, 0.95, 0.3])])?;
//! let payload = RawRulePayload::Structured(vec![
//!     json!({"name": "cpu_spike", "condition": "df['cpu'] > 0.85"}),
//! ]);
//!
//! let report = RuleSetPipeline::new().run(&payload, &table);
//! for result in &report.results {
//!     println!("{}: f1={:.2}", result.rule.name, result.score.f1);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compiled;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod oracle;
pub mod pipeline;
pub mod prompt;
pub mod report;

pub use compiled::{CompiledRule, CompiledRuleSet, RuleError};
pub use config::{PipelineConfig, ScalingMode};
pub use enhancer::{EnhancementReport, RuleEnhancer};
pub use error::{Result, SdkError};
pub use oracle::{MockOracle, OraclePrompt, RuleOracle};
pub use pipeline::RuleSetPipeline;
pub use prompt::PromptBuilder;
pub use report::{PipelineReport, RuleResult};

// Re-export the types callers need to build inputs and read results
pub use sherlock_core::{Diagnostic, DiagnosticKind, MetricsTable, Rule, Severity, TableSummary};
pub use sherlock_parser::{NormalizedRules, PayloadFormat, RawRulePayload, RuleNormalizer};
pub use sherlock_runtime::EffectivenessScore;
