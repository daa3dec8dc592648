//! Compile-once rule sets
//!
//! A rule's condition is parsed exactly once when the rule is compiled. The
//! compiled set can then be evaluated against any number of tables.

use crate::report::{PipelineReport, RuleResult};
use sherlock_core::ast::Expression;
use sherlock_core::{Diagnostic, MetricsTable, Rule};
use sherlock_parser::{ExpressionParser, ParseError};
use sherlock_runtime::{EffectivenessScore, EvalError, Evaluator, Scorer};
use thiserror::Error;

/// Why a single rule produced no mask
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl RuleError {
    fn into_diagnostic(self, rule: &str) -> Diagnostic {
        match self {
            RuleError::Parse(e) => Diagnostic::parse(rule, e.to_string()),
            RuleError::Eval(e) => Diagnostic::evaluation(rule, e.to_string()),
        }
    }
}

/// A rule together with its parsed condition
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    expression: std::result::Result<Expression, ParseError>,
}

impl CompiledRule {
    pub fn compile(rule: Rule, parser: &ExpressionParser) -> Self {
        let expression = parser.parse(&rule.condition);
        if let Err(e) = &expression {
            tracing::debug!("Rule '{}' failed to parse: {}", rule.name, e);
        }
        Self { rule, expression }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Parsed condition, or the parse failure
    pub fn expression(&self) -> std::result::Result<&Expression, &ParseError> {
        self.expression.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.expression.is_ok()
    }

    /// Evaluate the condition into a row mask
    pub fn evaluate(&self, table: &MetricsTable) -> std::result::Result<Vec<bool>, RuleError> {
        let expression = self.expression.as_ref().map_err(|e| e.clone())?;
        Ok(Evaluator::new(table).evaluate(expression)?)
    }

    /// Evaluate and score. Failures score zero and yield a diagnostic keyed
    /// by the rule name.
    pub fn score(&self, table: &MetricsTable) -> (RuleResult, Option<Diagnostic>) {
        let (score, diagnostic) = match self.evaluate(table) {
            Ok(mask) => (Scorer::score(&mask, table), None),
            Err(e) => {
                let diagnostic = e.into_diagnostic(&self.rule.name);
                tracing::warn!("Rule '{}' scored zero: {}", self.rule.name, diagnostic.message);
                (EffectivenessScore::zero(), Some(diagnostic))
            }
        };

        tracing::debug!(
            "Rule '{}': precision={:.4} recall={:.4} f1={:.4}",
            self.rule.name,
            score.precision,
            score.recall,
            score.f1
        );

        let result = RuleResult {
            rule: self.rule.clone(),
            score,
        };
        (result, diagnostic)
    }

    pub fn into_rule(self) -> Rule {
        self.rule
    }
}

/// Ordered collection of compiled rules
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    /// Compile rules against `alias['column']` references
    pub fn compile(rules: Vec<Rule>, table_alias: &str) -> Self {
        Self::with_parser(rules, &ExpressionParser::with_table_alias(table_alias))
    }

    pub fn with_parser(rules: Vec<Rule>, parser: &ExpressionParser) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| CompiledRule::compile(rule, parser))
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }

    /// Evaluate and score every rule sequentially
    pub fn evaluate(&self, table: &MetricsTable) -> PipelineReport {
        let mut report = PipelineReport::new(table.row_count());
        if table.is_empty() {
            tracing::warn!("Metrics table has no rows, all scores are zero");
            report.diagnostics.push(Diagnostic::empty_table());
        }

        for compiled in &self.rules {
            let (result, diagnostic) = compiled.score(table);
            report.push(result, diagnostic);
        }
        report
    }
}

impl IntoIterator for CompiledRuleSet {
    type Item = CompiledRule;
    type IntoIter = std::vec::IntoIter<CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompiledRuleSet {
    type Item = &'a CompiledRule;
    type IntoIter = std::slice::Iter<'a, CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
