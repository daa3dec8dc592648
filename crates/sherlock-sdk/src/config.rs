//! Configuration types for RuleSetPipeline

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use sherlock_core::ast::{DEFAULT_CONFIDENCE, DEFAULT_TABLE_ALIAS};
use std::path::Path;

/// Column preprocessing applied before evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    /// Evaluate on raw values
    #[default]
    None,
    /// Standardize every column to zero mean, unit variance
    ZScore,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Alias used in `alias['column']` references
    pub table_alias: String,

    /// Column preprocessing before evaluation
    pub scaling: ScalingMode,

    /// Confidence used when a raw value cannot be parsed
    pub default_confidence: f64,

    /// Evaluate rules concurrently on the blocking pool
    pub parallel: bool,

    /// Require `explanation` and `confidence` on structured records
    pub strict_structured: bool,
}

impl PipelineConfig {
    /// Create a new pipeline configuration
    pub fn new() -> Self {
        Self {
            table_alias: DEFAULT_TABLE_ALIAS.to_string(),
            scaling: ScalingMode::None,
            default_confidence: DEFAULT_CONFIDENCE,
            parallel: false,
            strict_structured: false,
        }
    }

    /// Set the table alias
    pub fn with_table_alias(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = alias.into();
        self
    }

    /// Set column scaling
    pub fn with_scaling(mut self, scaling: ScalingMode) -> Self {
        self.scaling = scaling;
        self
    }

    /// Set the fallback confidence
    pub fn with_default_confidence(mut self, confidence: f64) -> Self {
        self.default_confidence = confidence;
        self
    }

    /// Enable or disable concurrent evaluation
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable strict structured records
    pub fn with_strict_structured(mut self, strict: bool) -> Self {
        self.strict_structured = strict;
        self
    }

    /// Parse and validate a YAML configuration
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Check that the alias is a plain identifier and the confidence is in [0, 1]
    pub fn validate(&self) -> Result<()> {
        let alias = self.table_alias.as_str();
        let mut chars = alias.chars();
        let valid_start = chars
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SdkError::ConfigError(format!(
                "table_alias must be an identifier, got '{}'",
                alias
            )));
        }
        if matches!(alias, "and" | "or" | "not") {
            return Err(SdkError::ConfigError(format!(
                "table_alias cannot be the keyword '{}'",
                alias
            )));
        }

        if !(0.0..=1.0).contains(&self.default_confidence) {
            return Err(SdkError::ConfigError(format!(
                "default_confidence must be within [0, 1], got {}",
                self.default_confidence
            )));
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
