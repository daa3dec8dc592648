//! Rule oracle interface
//!
//! An oracle is any text generator that proposes anomaly rules. Its output
//! is untrusted and always goes back through the normalizer.

use crate::error::{Result, SdkError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Prompt sent to a rule oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OraclePrompt {
    /// System instructions
    pub system: String,

    /// User message carrying the metrics summary and existing rules
    pub user: String,

    /// Sampling temperature (0.0 - 1.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl OraclePrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Async rule oracle
#[async_trait]
pub trait RuleOracle: Send + Sync {
    /// Produce raw text for the prompt. The text is parsed by the caller.
    async fn generate(&self, prompt: &OraclePrompt) -> Result<String>;

    /// Get the name of this oracle
    fn name(&self) -> &str;
}

/// Canned oracle for tests and demos
///
/// Every prompt it receives is recorded and can be inspected with
/// [`MockOracle::prompts`].
#[derive(Debug)]
pub struct MockOracle {
    name: String,
    response: std::result::Result<String, String>,
    prompts: Mutex<Vec<OraclePrompt>>,
}

impl MockOracle {
    /// Create a mock returning an empty rule list
    pub fn new() -> Self {
        Self::with_response("[]")
    }

    /// Create with a custom response
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            response: Ok(response.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            response: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<OraclePrompt> {
        match self.prompts.lock() {
            Ok(prompts) => prompts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleOracle for MockOracle {
    async fn generate(&self, prompt: &OraclePrompt) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        self.response.clone().map_err(SdkError::OracleError)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
