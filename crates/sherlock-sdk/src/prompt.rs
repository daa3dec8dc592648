//! Prompt templates for rule enhancement

use crate::error::Result;
use crate::oracle::OraclePrompt;
use sherlock_core::ast::DEFAULT_TABLE_ALIAS;
use sherlock_core::{Rule, TableSummary};

/// System instructions for the rule oracle
pub const SYSTEM_PROMPT: &str = r#"You analyze database performance anomalies.
Given summary statistics of performance metrics and a set of candidate rules, produce precise anomaly rules that explain the observed behaviour.
Prefer actionable findings and short, concrete explanations."#;

/// User prompt template for enhancing an existing rule set
pub const ENHANCEMENT_PROMPT: &str = r#"Performance Metrics Summary:
{summary}

Existing Rules:
{rules}

Analyze these metrics and the existing rules, then:
1. Tighten rule precision with statistical thresholds
2. Give every rule a natural language explanation
3. Propose new rules for patterns visible in the metrics
4. Order rules by how likely they are to identify true anomalies

Condition syntax:
- Column reference: {alias}['column_name']
- Comparisons: >, <, >=, <=, ==, !=
- Arithmetic: +, -, *, /
- Logical: and, or, not (or &, |, ~)
- Time series: {alias}['column'].diff(), {alias}['column'].rolling(N).mean(), {alias}['column'].rolling(N).std()

Respond with a JSON array only, one object per rule:
[
  {
    "name": "<snake_case identifier>",
    "condition": "<condition expression>",
    "explanation": "<why this indicates an anomaly>",
    "confidence": <number between 0 and 1>
  }
]
"#;

/// Builds oracle prompts from a metrics summary and existing rules
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    table_alias: String,
    temperature: f32,
    max_tokens: u32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            table_alias: DEFAULT_TABLE_ALIAS.to_string(),
            temperature: 0.3,
            max_tokens: 2000,
        }
    }

    /// Alias shown in the condition syntax section
    pub fn with_table_alias(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = alias.into();
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the enhancement prompt
    pub fn build(&self, summary: &TableSummary, rules: &[Rule]) -> Result<OraclePrompt> {
        let rules_json = serde_json::to_string_pretty(rules)?;
        let user = render(
            ENHANCEMENT_PROMPT,
            &[
                ("summary", summary.render().as_str()),
                ("rules", rules_json.as_str()),
                ("alias", self.table_alias.as_str()),
            ],
        );

        Ok(OraclePrompt::new(SYSTEM_PROMPT, user)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens))
    }
}

/// Substitute `{key}` placeholders in a single pass, so substituted text is
/// never scanned for further placeholders.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let matched = values.iter().find_map(|(key, value)| {
            let key_len = key.len() + 2;
            let is_match = tail.len() >= key_len
                && tail[1..].starts_with(key)
                && tail[key_len - 1..].starts_with('}');
            is_match.then_some((key_len, *value))
        });

        match matched {
            Some((len, value)) => {
                out.push_str(value);
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sherlock_core::MetricsTable;

    #[test]
    fn test_build_prompt() {
        let table = MetricsTable::from_columns(vec![("cpu", vec![0.1, 0.9])]).unwrap();
        let rules = vec![Rule::new("cpu_spike", "df['cpu'] > 0.85")];

        let prompt = PromptBuilder::new().build(&table.summary(), &rules).unwrap();

        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert!(prompt.user.contains("\"name\": \"cpu_spike\""));
        assert!(prompt.user.contains("cpu"));
        assert!(prompt.user.contains("df['column_name']"));
        assert!(!prompt.user.contains("{summary}"));
        assert!(!prompt.user.contains("{rules}"));
        assert_eq!(prompt.temperature, Some(0.3));
        assert_eq!(prompt.max_tokens, Some(2000));
    }

    #[test]
    fn test_custom_alias() {
        let table = MetricsTable::from_columns(vec![("cpu", vec![0.1])]).unwrap();
        let prompt = PromptBuilder::new()
            .with_table_alias("metrics")
            .with_temperature(0.0)
            .build(&table.summary(), &[])
            .unwrap();

        assert!(prompt.user.contains("metrics['column_name']"));
        assert!(prompt.user.contains("Existing Rules:\n[]"));
        assert_eq!(prompt.temperature, Some(0.0));
    }

    #[test]
    fn test_render_is_single_pass() {
        let out = render("{a} {b} {c}", &[("a", "{b}"), ("b", "x")]);
        assert_eq!(out, "{b} x {c}");
    }
}
