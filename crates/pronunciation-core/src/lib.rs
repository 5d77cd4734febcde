//! Pronunciation Scorer
//!
//! Scores how closely a transcribed utterance matches a target phrase.
//! Metaphone codes aligned word-by-word carry most of the weight; a sentence
//! embedding similarity (Candle, all-MiniLM-L6-v2) smooths the result.
//!
//! # Architecture
//!
//! ```text
//! EvaluationRequest (JSON or obfuscated base64 payload)
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  PayloadCodec (encoded variant only)    │
//! │  drop idx 2, idx 7, last → base64 → JSON│
//! └─────────────────────────────────────────┘
//!       │
//!       ▼
//! ┌─────────────────────────────────────────┐
//! │  normalize: lowercase, strip punctuation│
//! └─────────────────────────────────────────┘
//!       │
//!       ├──────────────────────┐
//!       ▼                      ▼
//! ┌──────────────────┐  ┌──────────────────────┐
//! │ PhoneticScorer   │  │ SimilarityProvider   │
//! │ Metaphone +      │  │ embedding cosine     │
//! │ Levenshtein      │  │                      │
//! └──────────────────┘  └──────────────────────┘
//!       │                      │
//!       └──────────┬───────────┘
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  fuse: phonetic*wp + semantic*ws        │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  FeedbackClassifier: tier + message     │
//! └─────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod config;
pub mod embedder;
pub mod evaluator;
pub mod feedback;
pub mod fusion;
pub mod normalize;
pub mod phonetic;
pub mod similarity;
pub mod types;

pub use codec::PayloadCodec;
pub use config::{ConfigError, EvaluatorConfig};
pub use embedder::EmbeddingSimilarity;
pub use evaluator::PronunciationEvaluator;
pub use feedback::{FeedbackClassifier, MessageBank};
pub use fusion::FusionWeights;
pub use normalize::normalize;
pub use phonetic::{MetaphoneEncoder, PhoneticEncoder, PhoneticReport, PhoneticScorer};
pub use similarity::{ProviderError, SimilarityProvider};
pub use types::*;
