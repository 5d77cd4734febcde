//! Shared application state

use std::sync::Arc;

use pronunciation_core::PronunciationEvaluator;

/// The evaluator is built once at startup and shared read-only
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<PronunciationEvaluator>,
}

impl AppState {
    pub fn new(evaluator: PronunciationEvaluator) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }
}
