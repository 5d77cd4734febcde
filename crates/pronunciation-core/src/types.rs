//! Types for pronunciation evaluation

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::codec::CodecError;
use crate::similarity::ProviderError;

/// A spoken transcription paired with the phrase the learner was asked to say
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub transcribed_text: String,
    pub target_text: String,
}

impl EvaluationRequest {
    pub fn new(transcribed_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            transcribed_text: transcribed_text.into(),
            target_text: target_text.into(),
        }
    }
}

/// Lowercased, punctuation-stripped, trimmed text.
///
/// Only produced by [`crate::normalize::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub(crate) fn new_unchecked(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whitespace-separated words (runs of whitespace never yield empty words)
    pub fn words(&self) -> Vec<&str> {
        self.0.split_whitespace().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Phonetic comparison of one positional word pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticComparison {
    pub transcribed_word: String,
    pub target_word: String,
    pub phonetic_transcribed: String,
    pub phonetic_target: String,
    pub is_correct: bool,
}

/// The four feedback tiers, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeedbackTier {
    #[serde(rename = "Reprovado")]
    Reprovado,
    #[serde(rename = "Quase lá")]
    QuaseLa,
    #[serde(rename = "Aprovado (Pode melhorar)")]
    AprovadoPodeMelhorar,
    #[serde(rename = "Aprovado (Bom desempenho)")]
    AprovadoBomDesempenho,
}

impl FeedbackTier {
    pub const ALL: [FeedbackTier; 4] = [
        FeedbackTier::Reprovado,
        FeedbackTier::QuaseLa,
        FeedbackTier::AprovadoPodeMelhorar,
        FeedbackTier::AprovadoBomDesempenho,
    ];

    /// Classify a fused score (roughly 0.0-1.0).
    ///
    /// Intervals are closed-open, checked in ascending order. NaN lands in the
    /// lowest tier.
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() || score < 0.60 {
            FeedbackTier::Reprovado
        } else if score < 0.80 {
            FeedbackTier::QuaseLa
        } else if score < 0.95 {
            FeedbackTier::AprovadoPodeMelhorar
        } else {
            FeedbackTier::AprovadoBomDesempenho
        }
    }

    /// Status label as sent to clients
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackTier::Reprovado => "Reprovado",
            FeedbackTier::QuaseLa => "Quase lá",
            FeedbackTier::AprovadoPodeMelhorar => "Aprovado (Pode melhorar)",
            FeedbackTier::AprovadoBomDesempenho => "Aprovado (Bom desempenho)",
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier plus the encouragement message drawn for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub status: FeedbackTier,
    pub message: String,
}

/// How much of the phonetic breakdown is returned to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseDetailLevel {
    #[default]
    Minimal,
    Detailed,
}

impl std::str::FromStr for ResponseDetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" => Ok(ResponseDetailLevel::Minimal),
            "detailed" => Ok(ResponseDetailLevel::Detailed),
            other => Err(format!("unknown detail level: {}", other)),
        }
    }
}

/// Word-level breakdown returned at [`ResponseDetailLevel::Detailed`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetails {
    pub correct_words: Vec<String>,
    pub incorrect_words: Vec<String>,
    pub phonetic_details: Vec<PhoneticComparison>,
    pub correct_count: usize,
    pub incorrect_count: usize,
}

/// Result of evaluating one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Fused score scaled to 0-100, rounded to two decimals
    pub score: f64,
    pub feedback: Feedback,
    #[serde(flatten)]
    pub details: Option<EvaluationDetails>,
}

/// Errors that abort an evaluation
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Payload(#[from] CodecError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(FeedbackTier::from_score(0.5999), FeedbackTier::Reprovado);
        assert_eq!(FeedbackTier::from_score(0.6), FeedbackTier::QuaseLa);
        assert_eq!(FeedbackTier::from_score(0.7999), FeedbackTier::QuaseLa);
        assert_eq!(
            FeedbackTier::from_score(0.8),
            FeedbackTier::AprovadoPodeMelhorar
        );
        assert_eq!(
            FeedbackTier::from_score(0.95),
            FeedbackTier::AprovadoBomDesempenho
        );
        assert_eq!(
            FeedbackTier::from_score(1.2),
            FeedbackTier::AprovadoBomDesempenho
        );
        assert_eq!(FeedbackTier::from_score(-0.1), FeedbackTier::Reprovado);
        assert_eq!(FeedbackTier::from_score(f64::NAN), FeedbackTier::Reprovado);
    }

    #[test]
    fn test_tier_serializes_as_label() {
        for tier in FeedbackTier::ALL {
            let json = serde_json::to_value(tier).unwrap();
            assert_eq!(json, serde_json::Value::String(tier.label().to_string()));
        }
    }

    #[test]
    fn test_minimal_result_omits_details() {
        let result = EvaluationResult {
            score: 100.0,
            feedback: Feedback {
                status: FeedbackTier::AprovadoBomDesempenho,
                message: "Perfeito!".to_string(),
            },
            details: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(json["feedback"]["status"], "Aprovado (Bom desempenho)");
    }

    #[test]
    fn test_detailed_result_flattens() {
        let result = EvaluationResult {
            score: 50.0,
            feedback: Feedback {
                status: FeedbackTier::Reprovado,
                message: "Tente de novo!".to_string(),
            },
            details: Some(EvaluationDetails {
                correct_words: vec!["hello".to_string()],
                incorrect_words: vec!["word".to_string()],
                phonetic_details: vec![],
                correct_count: 1,
                incorrect_count: 1,
            }),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["correct_count"], 1);
        assert_eq!(json["incorrect_words"][0], "word");
    }

    #[test]
    fn test_detail_level_parse() {
        assert_eq!(
            "Detailed".parse::<ResponseDetailLevel>().unwrap(),
            ResponseDetailLevel::Detailed
        );
        assert!("verbose".parse::<ResponseDetailLevel>().is_err());
    }
}
