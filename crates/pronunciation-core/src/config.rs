//! Evaluator configuration
//!
//! Loaded from `PRONUNCIATION_*` environment variables or from a YAML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::fusion::FusionWeights;
use crate::types::{FeedbackTier, ResponseDetailLevel};

/// Default sentence-embedding model
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

pub const ENV_PHONETIC_WEIGHT: &str = "PRONUNCIATION_PHONETIC_WEIGHT";
pub const ENV_SEMANTIC_WEIGHT: &str = "PRONUNCIATION_SEMANTIC_WEIGHT";
pub const ENV_WEIGHT_PROFILE: &str = "PRONUNCIATION_WEIGHT_PROFILE";
pub const ENV_DETAIL_LEVEL: &str = "PRONUNCIATION_DETAIL_LEVEL";
pub const ENV_MODEL: &str = "PRONUNCIATION_MODEL";
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "PRONUNCIATION_PROVIDER_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid fusion weights (phonetic={phonetic}, semantic={semantic}): weights must be finite and non-negative")]
    InvalidWeights { phonetic: f64, semantic: f64 },

    #[error("Unknown weight profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Message bank for tier '{0}' is empty")]
    EmptyMessageBank(FeedbackTier),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Parse(String),
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub weights: FusionWeights,
    pub detail_level: ResponseDetailLevel,
    /// HuggingFace repo of the sentence-embedding model
    pub model_name: String,
    /// Upper bound on one semantic similarity call
    pub provider_timeout_ms: Option<u64>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::STANDARD,
            detail_level: ResponseDetailLevel::Minimal,
            model_name: DEFAULT_MODEL.to_string(),
            provider_timeout_ms: None,
        }
    }
}

impl EvaluatorConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(profile) = lookup(ENV_WEIGHT_PROFILE) {
            config.weights = FusionWeights::profile(&profile)
                .ok_or_else(|| ConfigError::UnknownProfile(profile.clone()))?;
        }
        if let Some(value) = lookup(ENV_PHONETIC_WEIGHT) {
            config.weights.phonetic = parse_value(ENV_PHONETIC_WEIGHT, &value)?;
        }
        if let Some(value) = lookup(ENV_SEMANTIC_WEIGHT) {
            config.weights.semantic = parse_value(ENV_SEMANTIC_WEIGHT, &value)?;
        }
        if let Some(value) = lookup(ENV_DETAIL_LEVEL) {
            config.detail_level = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_DETAIL_LEVEL.to_string(),
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_MODEL) {
            if !value.trim().is_empty() {
                config.model_name = value.trim().to_string();
            }
        }
        if let Some(value) = lookup(ENV_PROVIDER_TIMEOUT_MS) {
            config.provider_timeout_ms = Some(parse_value(ENV_PROVIDER_TIMEOUT_MS, &value)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a YAML string
    pub fn load_from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !self.weights.sums_to_one() {
            warn!(
                "Fusion weights sum to {} (phonetic={}, semantic={}); scores may leave [0, 1]",
                self.weights.phonetic + self.weights.semantic,
                self.weights.phonetic,
                self.weights.semantic
            );
        }
        Ok(())
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EvaluatorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EvaluatorConfig::default());
        assert_eq!(config.weights, FusionWeights::STANDARD);
        assert_eq!(config.provider_timeout(), None);
    }

    #[test]
    fn test_profile_then_override() {
        let config = EvaluatorConfig::from_lookup(lookup(&[
            (ENV_WEIGHT_PROFILE, "strict"),
            (ENV_DETAIL_LEVEL, "detailed"),
            (ENV_PROVIDER_TIMEOUT_MS, "2500"),
        ]))
        .unwrap();
        assert_eq!(config.weights, FusionWeights::STRICT);
        assert_eq!(config.detail_level, ResponseDetailLevel::Detailed);
        assert_eq!(config.provider_timeout(), Some(Duration::from_millis(2500)));

        let config = EvaluatorConfig::from_lookup(lookup(&[
            (ENV_PHONETIC_WEIGHT, "0.7"),
            (ENV_SEMANTIC_WEIGHT, "0.3"),
        ]))
        .unwrap();
        assert_eq!(config.weights, FusionWeights::new(0.7, 0.3).unwrap());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EvaluatorConfig::from_lookup(lookup(&[(ENV_PHONETIC_WEIGHT, "heavy")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            EvaluatorConfig::from_lookup(lookup(&[(ENV_WEIGHT_PROFILE, "lenient")])),
            Err(ConfigError::UnknownProfile(_))
        ));
        assert!(matches!(
            EvaluatorConfig::from_lookup(lookup(&[(ENV_SEMANTIC_WEIGHT, "-1")])),
            Err(ConfigError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_yaml() {
        let config = EvaluatorConfig::load_from_str(
            r#"
weights:
  phonetic: 0.9
  semantic: 0.1
detail_level: detailed
"#,
        )
        .unwrap();
        assert_eq!(config.weights, FusionWeights::STRICT);
        assert_eq!(config.detail_level, ResponseDetailLevel::Detailed);
        assert_eq!(config.model_name, DEFAULT_MODEL);
    }

    #[test]
    fn test_yaml_parse_error() {
        assert!(matches!(
            EvaluatorConfig::load_from_str("weights: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }
}
