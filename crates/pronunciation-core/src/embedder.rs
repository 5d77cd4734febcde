//! Sentence embedding using Candle and all-MiniLM-L6-v2
//!
//! Loads a BERT sentence-transformer from the HuggingFace Hub and computes
//! 384-dimensional embeddings. MiniLM is a paraphrase-similarity model, so
//! pooling is attention-masked mean pooling (not CLS) and there is no query
//! prefix: both texts are embedded symmetrically.

use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::config::DEFAULT_MODEL;
use crate::similarity::{cosine_similarity, ProviderError, SimilarityProvider};

/// Embedding dimension of all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// BERT sentence embedder
pub struct Embedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_name: String,
}

impl Embedder {
    /// Create a new embedder, downloading the model if needed
    ///
    /// The model is cached in the HuggingFace cache directory (~/.cache/huggingface).
    /// First download is ~90MB.
    pub fn new() -> Result<Self> {
        Self::with_model(DEFAULT_MODEL)
    }

    /// Create an embedder with a specific model name
    pub fn with_model(model_name: &str) -> Result<Self> {
        info!("Loading embedding model: {}", model_name);

        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_name.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .context("Failed to download config.json")?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer.json")?;
        let weights_path = repo
            .get("model.safetensors")
            .context("Failed to download model.safetensors")?;

        debug!("Model files downloaded to cache");

        let config: Config = serde_json::from_str(
            &std::fs::read_to_string(&config_path).context("Failed to read config.json")?,
        )
        .context("Failed to parse config.json")?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                .context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config).context("Failed to build BERT model")?;

        info!("Embedding model loaded successfully ({})", model_name);

        Ok(Self {
            model,
            tokenizer,
            device,
            model_name: model_name.to_string(),
        })
    }

    /// Batch forward pass with masked mean pooling and L2 normalization
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut all_input_ids = Vec::new();
        let mut all_attention_mask = Vec::new();
        let mut all_token_type_ids = Vec::new();

        for encoding in &encodings {
            let mut ids = encoding.get_ids().to_vec();
            let mut attention = encoding.get_attention_mask().to_vec();
            let mut type_ids = encoding.get_type_ids().to_vec();

            ids.resize(max_len, 0);
            attention.resize(max_len, 0);
            type_ids.resize(max_len, 0);

            all_input_ids.extend(ids);
            all_attention_mask.extend(attention);
            all_token_type_ids.extend(type_ids);
        }

        let batch_size = texts.len();

        let input_ids = Tensor::from_vec(all_input_ids, (batch_size, max_len), &self.device)?;
        let attention_mask =
            Tensor::from_vec(all_attention_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids =
            Tensor::from_vec(all_token_type_ids, (batch_size, max_len), &self.device)?;

        // (batch, seq_len, hidden)
        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean over real tokens only: sum(output * mask) / sum(mask)
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = output.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        let pooled = summed.broadcast_div(&counts)?;

        let normalized = Self::l2_normalize(&pooled)?;
        Ok(normalized.to_vec2::<f32>()?)
    }

    /// L2 normalize embeddings for cosine similarity
    fn l2_normalize(tensor: &Tensor) -> Result<Tensor> {
        let norm = tensor
            .sqr()?
            .sum_keepdim(1)?
            .sqrt()?
            .clamp(1e-12, f64::MAX)?;
        Ok(tensor.broadcast_div(&norm)?)
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding batch"))
    }

    /// Embed both texts in one batch and compare them
    pub fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32> {
        let embeddings = self.embed_batch(&[text_a, text_b])?;
        match embeddings.as_slice() {
            [a, b] => Ok(cosine_similarity(a, b)),
            _ => Err(anyhow::anyhow!(
                "Expected 2 embeddings, got {}",
                embeddings.len()
            )),
        }
    }

    pub fn embedding_dim(&self) -> usize {
        EMBEDDING_DIM
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// [`SimilarityProvider`] backed by a shared [`Embedder`].
///
/// Inference is CPU-bound, so each call runs on the blocking pool.
#[derive(Clone)]
pub struct EmbeddingSimilarity {
    embedder: Arc<Embedder>,
}

impl EmbeddingSimilarity {
    pub fn load(model_name: &str) -> Result<Self, ProviderError> {
        let embedder = Embedder::with_model(model_name)
            .map_err(|e| ProviderError::ModelLoad(format!("{:#}", e)))?;
        Ok(Self::from_embedder(Arc::new(embedder)))
    }

    pub fn from_embedder(embedder: Arc<Embedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl SimilarityProvider for EmbeddingSimilarity {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f32, ProviderError> {
        let embedder = Arc::clone(&self.embedder);
        let a = text_a.to_string();
        let b = text_b.to_string();

        tokio::task::spawn_blocking(move || embedder.similarity(&a, &b))
            .await
            .map_err(|e| ProviderError::Inference(e.to_string()))?
            .map_err(|e| ProviderError::Inference(format!("{:#}", e)))
    }

    fn name(&self) -> &str {
        self.embedder.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires model download
    fn test_embed_single() {
        let embedder = Embedder::new().expect("Failed to load embedder");
        let embedding = embedder.embed("hello world").expect("Failed to embed");

        assert_eq!(embedding.len(), EMBEDDING_DIM);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    #[ignore] // Requires model download
    fn test_identical_texts_score_one() {
        let embedder = Embedder::new().expect("Failed to load embedder");
        let sim = embedder.similarity("good morning", "good morning").unwrap();
        assert!((sim - 1.0).abs() < 1e-3, "got {}", sim);
    }

    #[test]
    #[ignore] // Requires model download
    fn test_paraphrase_beats_unrelated() {
        let embedder = Embedder::new().expect("Failed to load embedder");
        let close = embedder
            .similarity("i would like a coffee", "i want a coffee")
            .unwrap();
        let far = embedder
            .similarity("i would like a coffee", "the train leaves at noon")
            .unwrap();
        assert!(close > far, "Expected close ({}) > far ({})", close, far);
    }

    #[tokio::test]
    #[ignore] // Requires model download
    async fn test_provider_runs_off_runtime_thread() {
        let provider = EmbeddingSimilarity::load(DEFAULT_MODEL).unwrap();
        let sim = provider.similarity("thank you", "thanks").await.unwrap();
        assert!(sim > 0.5);
        assert_eq!(provider.name(), DEFAULT_MODEL);
    }
}
