//! Error types for configuration, rules, and the generation contract.
//!
//! None of these ever cross the `validate` boundary: rule errors become
//! findings, and configuration errors are raised before validation starts.

use std::path::PathBuf;
use thiserror::Error;

/// Internal fault reported by a rule instead of findings.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RuleError(pub String);

impl RuleError {
    pub fn new(msg: impl Into<String>) -> Self {
        RuleError(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid TOML: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{path} is not valid YAML: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid fragile selector pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown rule `{0}` in [rules].disable")]
    UnknownRule(String),
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generator is not configured: {0}")]
    NotConfigured(String),
    #[error("generated result is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("generation failed: {0}")]
    Failed(String),
}
