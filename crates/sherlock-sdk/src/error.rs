//! SDK error types

use sherlock_core::TableError;
use thiserror::Error;

/// SDK error type
///
/// Per-rule failures never surface here; they are reported as diagnostics
/// in the `PipelineReport`.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Metrics table violates its invariants
    #[error("Table error: {0}")]
    TableError(#[from] TableError),

    /// Rule oracle failed to produce a response
    #[error("Oracle error: {0}")]
    OracleError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
