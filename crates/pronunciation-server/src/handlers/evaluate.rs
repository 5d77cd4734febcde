//! POST /evaluate-pronunciation and POST /evaluate-pronunciation/encoded

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    Json,
};
use pronunciation_core::{EvaluationRequest, EvaluationResult};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Plain JSON `{ transcribed_text, target_text }`
pub async fn evaluate(
    State(state): State<AppState>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<EvaluationResult>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;
    let result = state.evaluator.evaluate(&request).await?;
    Ok(Json(result))
}

/// Obfuscated payload; see [`extract_wire_payload`] for accepted body shapes
pub async fn evaluate_encoded(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EvaluationResult>, AppError> {
    let wire = extract_wire_payload(&body)?;
    let result = state.evaluator.evaluate_encoded(&wire).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct PayloadEnvelope {
    payload: String,
}

/// Accepts the raw wire string, a JSON string literal, or `{"payload": "..."}`
///
/// A raw body is passed through untouched: its trailing throwaway character
/// may be whitespace.
pub fn extract_wire_payload(body: &[u8]) -> Result<String, AppError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| AppError::InvalidBody(format!("Body is not valid UTF-8: {}", e)))?;
    let json = text.trim();

    if json.starts_with('"') {
        return serde_json::from_str::<String>(json)
            .map_err(|e| AppError::InvalidBody(format!("Invalid JSON string body: {}", e)));
    }
    if json.starts_with('{') {
        return serde_json::from_str::<PayloadEnvelope>(json)
            .map(|envelope| envelope.payload)
            .map_err(|e| AppError::InvalidBody(format!("Invalid payload envelope: {}", e)));
    }
    Ok(text.to_string())
}
