//! Process-wide runtime context
//!
//! Built once at startup and shared by handle. Holds the capabilities and
//! the currently loaded document. Replacing the document and answering a
//! question go through one reader/writer lock: a query holds the read side
//! for its whole duration, so an ingest never interleaves with a question.

use crate::config::AppConfig;
use crate::context::{AnswerResult, AnswerRouter};
use crate::document::{Chunk, DocumentModel, ProvenanceMode, StructuredPage};
use crate::embeddings::create_embedder;
use crate::errors::{AppError, Result};
use crate::llm::{create_generator, Generator};
use crate::retrieval::{InMemoryIndex, Retriever, VectorIndex};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Document currently answering questions
#[derive(Debug, Clone, Serialize)]
pub struct LoadedDocument {
    pub source_name: String,
    pub model: DocumentModel,
    pub structure: Vec<StructuredPage>,
    pub chunk_count: usize,
    pub mode: ProvenanceMode,
    pub ingested_at: DateTime<Utc>,
}

pub struct Runtime {
    config: Arc<AppConfig>,
    index: Arc<dyn VectorIndex>,
    router: AnswerRouter,
    document: RwLock<Option<Arc<LoadedDocument>>>,
}

impl Runtime {
    /// Build every capability from configuration
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let embedder = create_embedder(&config.embedding)?;
        let index: Arc<dyn VectorIndex> = Arc::new(InMemoryIndex::new(embedder));
        let fast = create_generator(&config.llm, &config.llm.fast_model)?;
        let main = create_generator(&config.llm, &config.llm.model)?;

        info!(
            llm_provider = %config.llm.provider,
            fast_model = fast.model_name(),
            main_model = main.model_name(),
            embedding_provider = %config.embedding.provider,
            top_k = config.retrieval.top_k,
            "Runtime initialized"
        );

        Ok(Self::new(config, fast, main, index))
    }

    /// Assemble a runtime from existing capabilities
    pub fn new(
        config: AppConfig,
        fast: Arc<dyn Generator>,
        main: Arc<dyn Generator>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        let retriever = Retriever::new(index.clone(), config.retrieval.top_k);
        let router = AnswerRouter::new(fast, main, retriever, &config.answering);

        Self {
            config: Arc::new(config),
            index,
            router,
            document: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Swap in a new document and its chunks as one step
    ///
    /// The index keeps its previous content when reindexing fails.
    pub async fn replace_document(
        &self,
        mut document: LoadedDocument,
        chunks: Vec<Chunk>,
    ) -> Result<Arc<LoadedDocument>> {
        let mut current = self.document.write().await;

        document.chunk_count = self.index.reindex(chunks).await?;
        let document = Arc::new(document);
        *current = Some(document.clone());

        info!(
            source = %document.source_name,
            chunks = document.chunk_count,
            pages = document.model.page_count(),
            mode = document.mode.as_str(),
            "Document loaded"
        );
        Ok(document)
    }

    pub async fn current_document(&self) -> Option<Arc<LoadedDocument>> {
        self.document.read().await.clone()
    }

    /// Page structure of the loaded document
    pub async fn current_structure(&self) -> Result<Vec<StructuredPage>> {
        self.current_document()
            .await
            .map(|d| d.structure.clone())
            .ok_or(AppError::DocumentNotLoaded)
    }

    /// Answer one question against the loaded document
    pub async fn ask(&self, question: &str) -> Result<AnswerResult> {
        let document = self.document.read().await;
        self.router
            .answer(question, document.as_deref().map(|d| &d.model))
            .await
    }
}
