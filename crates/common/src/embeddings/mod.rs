//! Embedding service abstraction
//!
//! Provides a unified interface for the embedding capability behind the
//! vector index:
//! - OpenAI-compatible HTTP endpoints (text-embedding-3-small, local servers)
//! - A deterministic feature-hashing embedder for offline runs and tests

use crate::config::EmbeddingConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for embedding generation
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;
}

/// OpenAI-compatible embedding client
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimension: usize,
    base_url: String,
    batch_size: usize,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    data: Vec<OpenAIEmbedding>,
}

#[derive(Deserialize)]
struct OpenAIEmbedding {
    embedding: Vec<f32>,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI-compatible embedder
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            dimension: config.dimension,
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            batch_size: config.batch_size.max(1),
        })
    }

    async fn make_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);

        let request = OpenAIRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: OpenAIResponse = response.json().await.map_err(|e| AppError::EmbeddingError {
            message: format!("Failed to parse response: {}", e),
        })?;

        if result.data.len() != texts.len() {
            return Err(AppError::EmbeddingError {
                message: format!(
                    "Expected {} embeddings, received {}",
                    texts.len(),
                    result.data.len()
                ),
            });
        }

        Ok(result.data.into_iter().map(|e| e.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings.into_iter().next().ok_or_else(|| AppError::EmbeddingError {
            message: "Empty response".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let start = Instant::now();
            let result = self.make_request(chunk).await;
            metrics::record_embedding(
                start.elapsed().as_secs_f64(),
                &self.model,
                chunk.len(),
                result.is_ok(),
            );
            all_embeddings.extend(result?);
        }

        Ok(all_embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Feature-hashing bag-of-words embedder
///
/// Deterministic and dependency free: each lowercase word is hashed into one
/// of `dimension` buckets with a hash-derived sign, and the result is
/// L2-normalized. Texts sharing words get positive cosine similarity.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let digest = Sha256::digest(word.to_lowercase().as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }

    fn model_name(&self) -> &str {
        "feature-hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "openai" => {
            let key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
                message: "embedding.api_key is required for the openai provider".to_string(),
            })?;
            Ok(Arc::new(OpenAIEmbedder::new(config, key)?))
        }
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimension))),
        other => {
            tracing::warn!(provider = other, "Unknown embedding provider, using feature hashing");
            Ok(Arc::new(HashingEmbedder::new(config.dimension)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::new(128);
        let a = embedder.embed("Quarterly revenue report").await.unwrap();
        let b = embedder.embed("quarterly REVENUE report").await.unwrap();
        assert_eq!(a.len(), 128);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hashing_similarity_tracks_overlap() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.embed("revenue growth in europe").await.unwrap();
        let related = embedder.embed("europe saw strong revenue growth").await.unwrap();
        let unrelated = embedder.embed("the cat sat on a mat").await.unwrap();
        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed("   ").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_batch() {
        let embedder = HashingEmbedder::new(64);
        let texts = vec!["text1".to_string(), "text2".to_string()];
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 64);
    }

    #[test]
    fn test_openai_provider_requires_key() {
        let config = EmbeddingConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_embedder(&config),
            Err(AppError::Configuration { .. })
        ));
    }
}
