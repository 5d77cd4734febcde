//! Semantic similarity capability
//!
//! The evaluator only needs a score for two normalized strings; the model
//! behind it is swappable (Candle embeddings in production, fixed scores in
//! tests).

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to load similarity model: {0}")]
    ModelLoad(String),

    #[error("Similarity inference failed: {0}")]
    Inference(String),

    #[error("Similarity provider timed out after {0} ms")]
    Timeout(u64),
}

/// Semantic similarity of two texts, roughly in [0, 1].
///
/// Cosine-based providers may return slightly negative values.
#[async_trait]
pub trait SimilarityProvider: Send + Sync {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32, ProviderError>;

    /// Identifier used in logs
    fn name(&self) -> &str {
        "similarity-provider"
    }
}

/// Cosine similarity; zero or mismatched vectors score 0.0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
