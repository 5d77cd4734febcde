//! Pronunciation evaluator - the full scoring pipeline
//!
//! normalize → phonetic ∥ semantic → fuse → classify. Any failure aborts the
//! whole evaluation; there are no partial results.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    codec::PayloadCodec,
    config::EvaluatorConfig,
    feedback::FeedbackClassifier,
    fusion::{fuse, to_percent},
    normalize::normalize,
    phonetic::{PhoneticReport, PhoneticScorer},
    similarity::{ProviderError, SimilarityProvider},
    types::{
        EvaluationDetails, EvaluationError, EvaluationRequest, EvaluationResult,
        ResponseDetailLevel,
    },
};

/// Stateless per request; the shared pieces are read-only after construction
pub struct PronunciationEvaluator {
    config: EvaluatorConfig,
    phonetic: PhoneticScorer,
    provider: Arc<dyn SimilarityProvider>,
    classifier: FeedbackClassifier,
}

impl PronunciationEvaluator {
    pub fn new(
        config: EvaluatorConfig,
        phonetic: PhoneticScorer,
        provider: Arc<dyn SimilarityProvider>,
        classifier: FeedbackClassifier,
    ) -> Self {
        info!(
            "PronunciationEvaluator ready (provider={}, weights={}/{}, detail={:?})",
            provider.name(),
            config.weights.phonetic,
            config.weights.semantic,
            config.detail_level
        );
        Self {
            config,
            phonetic,
            provider,
            classifier,
        }
    }

    /// Default Metaphone scorer and built-in message banks
    pub fn with_provider(config: EvaluatorConfig, provider: Arc<dyn SimilarityProvider>) -> Self {
        Self::new(
            config,
            PhoneticScorer::new(),
            provider,
            FeedbackClassifier::default(),
        )
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate an obfuscated wire payload
    pub async fn evaluate_encoded(
        &self,
        encoded: &str,
    ) -> Result<EvaluationResult, EvaluationError> {
        let request = PayloadCodec::decode(encoded).map_err(|e| {
            warn!("Rejected encoded payload: {}", e);
            e
        })?;
        self.evaluate(&request).await
    }

    #[instrument(skip(self, request), fields(target = %request.target_text))]
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        let transcribed = normalize(&request.transcribed_text);
        let target = normalize(&request.target_text);

        let report = self.phonetic.score(&transcribed, &target);
        let semantic = self
            .semantic_similarity(transcribed.as_str(), target.as_str())
            .await?;

        let fused = fuse(report.similarity, semantic, self.config.weights);
        let feedback = self.classifier.classify(fused);

        debug!(
            phonetic = report.similarity,
            semantic,
            fused,
            status = %feedback.status,
            "Evaluation scored"
        );

        Ok(EvaluationResult {
            score: to_percent(fused),
            feedback,
            details: self.details(report),
        })
    }

    async fn semantic_similarity(&self, a: &str, b: &str) -> Result<f64, ProviderError> {
        let call = self.provider.similarity(a, b);
        let score = match self.config.provider_timeout() {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                warn!("Similarity provider exceeded {:?}", limit);
                ProviderError::Timeout(limit.as_millis() as u64)
            })??,
            None => call.await?,
        };
        Ok(score as f64)
    }

    fn details(&self, report: PhoneticReport) -> Option<EvaluationDetails> {
        match self.config.detail_level {
            ResponseDetailLevel::Minimal => None,
            ResponseDetailLevel::Detailed => Some(report.into_details()),
        }
    }
}
