//! Rule set pipeline
//!
//! normalize → compile → (scale) → evaluate → score, over one table.
//! Only an invalid table is fatal. Every per-rule failure becomes a
//! diagnostic and a zero score.

use crate::compiled::CompiledRuleSet;
use crate::config::{PipelineConfig, ScalingMode};
use crate::error::Result;
use crate::report::{PipelineReport, RuleResult};
use futures::future::join_all;
use sherlock_core::{Diagnostic, MetricsTable, Rule};
use sherlock_parser::{ExpressionParser, NormalizedRules, RawRulePayload, RuleNormalizer};
use sherlock_runtime::{standardize, EffectivenessScore};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Orchestrates normalization, evaluation and scoring of a rule payload
#[derive(Debug, Clone)]
pub struct RuleSetPipeline {
    config: PipelineConfig,
    normalizer: RuleNormalizer,
    parser: ExpressionParser,
}

impl Default for RuleSetPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSetPipeline {
    /// Create a pipeline with the default configuration
    pub fn new() -> Self {
        Self::build(PipelineConfig::default())
    }

    /// Create a pipeline from a validated configuration
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: PipelineConfig) -> Self {
        let normalizer = RuleNormalizer::new()
            .with_default_confidence(config.default_confidence)
            .with_strict(config.strict_structured);
        let parser = ExpressionParser::with_table_alias(config.table_alias.clone());
        Self {
            config,
            normalizer,
            parser,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize a raw payload, logging every skipped element
    pub fn normalize(&self, payload: &RawRulePayload) -> NormalizedRules {
        let normalized = self.normalizer.normalize(payload);
        for diagnostic in &normalized.diagnostics {
            tracing::warn!("Skipped rule input: {}", diagnostic);
        }
        normalized
    }

    /// Parse every rule's condition once
    pub fn compile(&self, rules: Vec<Rule>) -> CompiledRuleSet {
        CompiledRuleSet::with_parser(rules, &self.parser)
    }

    /// Run the whole pipeline sequentially
    pub fn run(&self, payload: &RawRulePayload, table: &MetricsTable) -> PipelineReport {
        let normalized = self.normalize(payload);
        let compiled = self.compile(normalized.rules);
        let eval_table = self.prepare_table(table);

        let report = compiled.evaluate(&eval_table);
        self.finish(normalized.diagnostics, normalized.skipped, report)
    }

    /// Build the table from rows, then run. Inconsistent rows are a hard error.
    pub fn run_rows<I>(&self, payload: &RawRulePayload, rows: I) -> Result<PipelineReport>
    where
        I: IntoIterator<Item = HashMap<String, f64>>,
    {
        let table = MetricsTable::from_rows(rows)?;
        Ok(self.run(payload, &table))
    }

    /// Run the pipeline with one blocking task per rule
    ///
    /// The table is shared read-only between tasks. Output order matches the
    /// normalized rule order regardless of completion order.
    pub async fn run_concurrent(
        &self,
        payload: &RawRulePayload,
        table: Arc<MetricsTable>,
    ) -> PipelineReport {
        let normalized = self.normalize(payload);
        let compiled = self.compile(normalized.rules);

        let eval_table = match self.prepare_table(&table) {
            Cow::Borrowed(_) => Arc::clone(&table),
            Cow::Owned(scaled) => Arc::new(scaled),
        };

        let mut report = PipelineReport::new(eval_table.row_count());
        if eval_table.is_empty() {
            tracing::warn!("Metrics table has no rows, all scores are zero");
            report.diagnostics.push(Diagnostic::empty_table());
        }

        let tasks = compiled.into_iter().map(|rule| {
            let table = Arc::clone(&eval_table);
            let fallback = rule.rule().clone();
            let handle = tokio::task::spawn_blocking(move || rule.score(&table));
            async move {
                handle.await.unwrap_or_else(|e| {
                    tracing::warn!("Evaluation task for rule '{}' failed: {}", fallback.name, e);
                    let diagnostic = Diagnostic::evaluation(
                        &fallback.name,
                        format!("evaluation task failed: {}", e),
                    );
                    let result = RuleResult {
                        rule: fallback,
                        score: EffectivenessScore::zero(),
                    };
                    (result, Some(diagnostic))
                })
            }
        });

        for (result, diagnostic) in join_all(tasks).await {
            report.push(result, diagnostic);
        }

        self.finish(normalized.diagnostics, normalized.skipped, report)
    }

    /// Run concurrently when `parallel` is configured, otherwise sequentially
    pub async fn run_configured(
        &self,
        payload: &RawRulePayload,
        table: Arc<MetricsTable>,
    ) -> PipelineReport {
        if self.config.parallel {
            self.run_concurrent(payload, table).await
        } else {
            self.run(payload, &table)
        }
    }

    /// Apply the configured scaling. Falls back to raw values if scaling
    /// cannot preserve the table shape.
    fn prepare_table<'a>(&self, table: &'a MetricsTable) -> Cow<'a, MetricsTable> {
        match self.config.scaling {
            ScalingMode::None => Cow::Borrowed(table),
            ScalingMode::ZScore => match standardize(table) {
                Ok(scaled) => Cow::Owned(scaled),
                Err(e) => {
                    tracing::warn!("Standardization failed, evaluating raw values: {}", e);
                    Cow::Borrowed(table)
                }
            },
        }
    }

    fn finish(
        &self,
        normalization: Vec<Diagnostic>,
        skipped: usize,
        mut report: PipelineReport,
    ) -> PipelineReport {
        let mut diagnostics = normalization;
        diagnostics.append(&mut report.diagnostics);
        report.diagnostics = diagnostics;
        report.skipped = skipped;

        tracing::info!(
            "Rule set run complete: {} rules over {} rows, {} skipped, {} diagnostics",
            report.results.len(),
            report.row_count,
            report.skipped,
            report.diagnostics.len()
        );
        report
    }
}
