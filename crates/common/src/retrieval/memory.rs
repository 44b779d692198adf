//! In-memory cosine-similarity index

use super::VectorIndex;
use crate::document::{Chunk, RetrievedChunk};
use crate::embeddings::Embedder;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

struct IndexedChunk {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Holds every chunk of the current document with its embedding
pub struct InMemoryIndex {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<IndexedChunk>>,
}

impl InMemoryIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let entries = self.entries.read().await;
        if entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<(f32, &IndexedChunk)> = entries
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, &entry.embedding), entry))
            .collect();

        // Stable sort keeps document order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(rank, (score, entry))| RetrievedChunk {
                chunk: entry.chunk.clone(),
                rank,
                score: Some(score),
            })
            .collect())
    }

    async fn reindex(&self, chunks: Vec<Chunk>) -> Result<usize> {
        let mut seen = HashSet::new();
        let unique: Vec<Chunk> = chunks
            .into_iter()
            .filter(|c| seen.insert(c.fingerprint()))
            .collect();

        let texts: Vec<String> = unique.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != unique.len() {
            return Err(AppError::RetrievalError {
                message: format!(
                    "Embedder returned {} vectors for {} chunks",
                    embeddings.len(),
                    unique.len()
                ),
            });
        }

        let fresh: Vec<IndexedChunk> = unique
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        let count = fresh.len();
        let mut entries = self.entries.write().await;
        let replaced = entries.len();
        *entries = fresh;

        info!(
            chunks = count,
            replaced,
            model = self.embedder.model_name(),
            "Index replaced"
        );
        debug!(dimension = self.embedder.dimension(), "Embeddings stored");

        Ok(count)
    }

    async fn chunk_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
