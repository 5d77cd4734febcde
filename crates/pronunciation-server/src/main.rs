//! pronunciation-server — standalone REST server for pronunciation scoring.
//!
//! Configuration comes from `PRONUNCIATION_*` env vars (a `.env` file is
//! honoured); see `config.rs` for the server keys and
//! `pronunciation_core::config` for the evaluator keys.

use std::sync::Arc;

use anyhow::Context;
use pronunciation_core::{
    EmbeddingSimilarity, FeedbackClassifier, PhoneticScorer, PronunciationEvaluator,
};
use pronunciation_server::config::ServerConfig;
use pronunciation_server::router::build_router;
use pronunciation_server::state::AppState;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pronunciation_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let bank = config.message_bank()?;

    // Model download + load is blocking and slow on first run
    let model_name = config.evaluator.model_name.clone();
    tracing::info!("Loading similarity model {} (downloading if needed)", model_name);
    let provider = tokio::task::spawn_blocking(move || EmbeddingSimilarity::load(&model_name))
        .await
        .context("Model loading task panicked")??;

    let evaluator = PronunciationEvaluator::new(
        config.evaluator.clone(),
        PhoneticScorer::new(),
        Arc::new(provider),
        FeedbackClassifier::new(bank),
    );

    let app = build_router(AppState::new(evaluator));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("pronunciation-server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
