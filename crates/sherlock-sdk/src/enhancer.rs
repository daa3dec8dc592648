//! Oracle-driven rule enhancement
//!
//! Runs a legacy rule set, asks an oracle for improved rules, runs those
//! against the same table and keeps both reports side by side.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::oracle::RuleOracle;
use crate::pipeline::RuleSetPipeline;
use crate::prompt::PromptBuilder;
use crate::report::PipelineReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sherlock_core::MetricsTable;
use sherlock_parser::RawRulePayload;
use std::path::Path;
use std::sync::Arc;

/// Original and oracle-enhanced runs over the same table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementReport {
    pub original: PipelineReport,
    pub enhanced: PipelineReport,
}

impl EnhancementReport {
    /// JSON document with rules and metrics of both runs
    ///
    /// Metrics are keyed by rule name. Diagnostics are tagged with the run
    /// that produced them.
    pub fn to_json_value(&self) -> Value {
        let diagnostics: Vec<Value> = [("original", &self.original), ("enhanced", &self.enhanced)]
            .into_iter()
            .flat_map(|(run, report)| {
                report.diagnostics.iter().map(move |d| {
                    json!({
                        "run": run,
                        "kind": d.kind,
                        "context": d.context,
                        "message": d.message,
                    })
                })
            })
            .collect();

        json!({
            "original_rules": self.original.rules().collect::<Vec<_>>(),
            "enhanced_rules": self.enhanced.rules().collect::<Vec<_>>(),
            "original_metrics": self.original.metrics_by_name(),
            "enhanced_metrics": self.enhanced.metrics_by_name(),
            "diagnostics": diagnostics,
        })
    }

    /// Write the JSON document to `path`
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.to_json_value())?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Compares a legacy rule set with oracle-proposed replacements
pub struct RuleEnhancer {
    oracle: Arc<dyn RuleOracle>,
    pipeline: RuleSetPipeline,
    prompts: PromptBuilder,
}

impl RuleEnhancer {
    /// Create with default configuration
    pub fn new(oracle: Arc<dyn RuleOracle>) -> Self {
        Self {
            oracle,
            pipeline: RuleSetPipeline::new(),
            prompts: PromptBuilder::new(),
        }
    }

    /// Create with a validated pipeline configuration
    pub fn with_config(oracle: Arc<dyn RuleOracle>, config: PipelineConfig) -> Result<Self> {
        let prompts = PromptBuilder::new().with_table_alias(config.table_alias.clone());
        let pipeline = RuleSetPipeline::with_config(config)?;
        Ok(Self {
            oracle,
            pipeline,
            prompts,
        })
    }

    /// Override the prompt builder
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn pipeline(&self) -> &RuleSetPipeline {
        &self.pipeline
    }

    /// Run the legacy payload, ask the oracle for enhanced rules and run them
    ///
    /// Oracle failures are returned as errors. Anything wrong inside the
    /// oracle's answer is reported as diagnostics of the enhanced run.
    pub async fn enhance(
        &self,
        table: Arc<MetricsTable>,
        legacy: &RawRulePayload,
    ) -> Result<EnhancementReport> {
        let original = self.pipeline.run_configured(legacy, Arc::clone(&table)).await;

        let existing: Vec<_> = original.rules().cloned().collect();
        let prompt = self.prompts.build(&table.summary(), &existing)?;

        tracing::info!(
            "Requesting enhanced rules from oracle '{}' for {} existing rules",
            self.oracle.name(),
            existing.len()
        );
        let response = self.oracle.generate(&prompt).await?;
        tracing::debug!("Oracle response: {} bytes", response.len());

        let enhanced = self
            .pipeline
            .run_configured(&RawRulePayload::Text(response), table)
            .await;

        Ok(EnhancementReport { original, enhanced })
    }
}
