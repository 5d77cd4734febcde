//! Server configuration from environment variables
//!
//!   PRONUNCIATION_BIND_ADDR — listen address (default: 0.0.0.0:8000)
//!   PRONUNCIATION_CONFIG    — optional YAML evaluator config, replaces env-derived settings
//!   PRONUNCIATION_MESSAGES  — optional YAML message banks, replaces the built-in ones

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pronunciation_core::{EvaluatorConfig, MessageBank};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub evaluator: EvaluatorConfig,
    pub messages_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("PRONUNCIATION_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());

        let evaluator = match std::env::var("PRONUNCIATION_CONFIG") {
            Ok(path) => EvaluatorConfig::load_from_file(Path::new(&path))
                .with_context(|| format!("Failed to load evaluator config from {}", path))?,
            Err(_) => EvaluatorConfig::from_env().context("Invalid PRONUNCIATION_* settings")?,
        };

        let messages_path = std::env::var("PRONUNCIATION_MESSAGES").ok().map(PathBuf::from);

        Ok(Self {
            bind_addr,
            evaluator,
            messages_path,
        })
    }

    pub fn message_bank(&self) -> Result<MessageBank> {
        match &self.messages_path {
            Some(path) => MessageBank::load_from_file(path)
                .with_context(|| format!("Failed to load message banks from {}", path.display())),
            None => Ok(MessageBank::builtin()),
        }
    }
}
