//! HTTP error mapping
//!
//! Every failure becomes `500 {"detail": "<message>"}` so existing clients
//! keep working. The variants stay distinct for logging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pronunciation_core::EvaluationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("{0}")]
    InvalidBody(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Evaluation(EvaluationError::Provider(e)) => {
                tracing::error!("Similarity provider failed: {}", e)
            }
            AppError::Evaluation(EvaluationError::Payload(e)) => {
                tracing::warn!("Malformed payload: {}", e)
            }
            AppError::InvalidBody(msg) => tracing::warn!("Invalid request body: {}", msg),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
