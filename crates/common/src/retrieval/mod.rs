//! Retrieval over the document's chunks
//!
//! The vector index is an external capability: this module only defines its
//! contract ([`VectorIndex`]), ships an in-memory implementation backed by an
//! [`Embedder`](crate::embeddings::Embedder), and wraps it in the
//! per-question [`Retriever`].

mod memory;

pub use memory::InMemoryIndex;

use crate::document::{Chunk, RetrievedChunk};
use crate::errors::Result;
use crate::metrics;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Nearest-neighbour search over stored chunks
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Top `k` chunks for `query`, most relevant first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Replace the whole index content; returns the number of stored chunks
    async fn reindex(&self, chunks: Vec<Chunk>) -> Result<usize>;

    /// Number of stored chunks
    async fn chunk_count(&self) -> usize;
}

/// Retrieval client used by the answer router
#[derive(Clone)]
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    k: usize,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, k: usize) -> Self {
        Self { index, k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Top-k chunks for a question; index failures propagate unchanged
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let start = Instant::now();
        let chunks = self.index.search(query, self.k).await?;
        let elapsed = start.elapsed();

        metrics::record_retrieval(elapsed.as_secs_f64(), chunks.len());
        debug!(
            k = self.k,
            results = chunks.len(),
            latency_ms = elapsed.as_millis() as u64,
            "Chunks retrieved"
        );

        Ok(chunks)
    }
}
