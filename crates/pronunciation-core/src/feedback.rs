//! Feedback tiers and encouragement messages
//!
//! The tier is a pure function of the fused score. The message is a uniform
//! draw from the tier's bank using a process-wide RNG that tests can seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;

use crate::config::ConfigError;
use crate::types::{Feedback, FeedbackTier};

/// Built-in message banks
const BUILTIN_MESSAGES: &str = include_str!("../resources/feedback_messages.yaml");

/// Fixed, non-empty message list per tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBank {
    pub reprovado: Vec<String>,
    pub quase_la: Vec<String>,
    pub aprovado_pode_melhorar: Vec<String>,
    pub aprovado_bom_desempenho: Vec<String>,
}

impl MessageBank {
    /// Messages bundled with the crate
    pub fn builtin() -> Self {
        // The bundled file is covered by tests; failing here is a packaging bug.
        Self::load_from_str(BUILTIN_MESSAGES).expect("bundled feedback_messages.yaml is valid")
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
        let bank: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        bank.validate()?;
        Ok(bank)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for tier in FeedbackTier::ALL {
            if self.messages(tier).is_empty() {
                return Err(ConfigError::EmptyMessageBank(tier));
            }
        }
        Ok(())
    }

    pub fn messages(&self, tier: FeedbackTier) -> &[String] {
        match tier {
            FeedbackTier::Reprovado => &self.reprovado,
            FeedbackTier::QuaseLa => &self.quase_la,
            FeedbackTier::AprovadoPodeMelhorar => &self.aprovado_pode_melhorar,
            FeedbackTier::AprovadoBomDesempenho => &self.aprovado_bom_desempenho,
        }
    }

    /// Uniform draw from the tier's bank
    pub fn sample<R: Rng + ?Sized>(&self, tier: FeedbackTier, rng: &mut R) -> &str {
        self.messages(tier)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Default for MessageBank {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Maps fused scores to a tier and an encouragement message
pub struct FeedbackClassifier {
    bank: MessageBank,
    rng: Mutex<StdRng>,
}

impl Default for FeedbackClassifier {
    fn default() -> Self {
        Self::new(MessageBank::builtin())
    }
}

impl FeedbackClassifier {
    /// Classifier drawing from an entropy-seeded RNG
    pub fn new(bank: MessageBank) -> Self {
        Self {
            bank,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Classifier with a reproducible message sequence
    pub fn with_seed(bank: MessageBank, seed: u64) -> Self {
        Self {
            bank,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn bank(&self) -> &MessageBank {
        &self.bank
    }

    pub fn classify(&self, fused_score: f64) -> Feedback {
        let status = FeedbackTier::from_score(fused_score);
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let message = self.bank.sample(status, &mut *rng).to_string();
        Feedback { status, message }
    }
}
