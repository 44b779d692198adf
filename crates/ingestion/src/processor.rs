//! Ingestion processor
//!
//! The document ingestion boundary: parsed blocks in, a loaded document and
//! a replaced index out.

use crate::chunker::Chunker;
use crate::errors::IngestionError;
use chrono::{DateTime, Utc};
use pagewise_common::config::ChunkingConfig;
use pagewise_common::document::{
    build_page_structure, classifier_for, normalize_blocks, tag_blocks, CaseLengthClassifier,
    Chunk, ClassifierStrategy, DocumentModel, ParsedDocument, ProvenanceMode,
};
use pagewise_common::metrics;
use pagewise_common::runtime::{LoadedDocument, Runtime};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument};

/// Summary of one ingestion, as printed by the CLI and returned over HTTP
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub source_name: String,
    pub block_count: usize,
    pub page_count: usize,
    pub chunk_count: usize,
    pub mode: ProvenanceMode,
    pub ingested_at: DateTime<Utc>,
}

impl IngestionReport {
    pub fn from_document(document: &LoadedDocument) -> Self {
        Self {
            source_name: document.source_name.clone(),
            block_count: document.model.blocks.len(),
            page_count: document.model.page_count(),
            chunk_count: document.chunk_count,
            mode: document.mode,
            ingested_at: document.ingested_at,
        }
    }
}

/// Document model, structure and chunks, ready to be loaded
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub document: LoadedDocument,
    pub chunks: Vec<Chunk>,
}

pub struct DocumentIngestor {
    chunker: Chunker,
    structure_strategy: ClassifierStrategy,
}

impl DocumentIngestor {
    pub fn new(config: &ChunkingConfig) -> Result<Self, IngestionError> {
        Ok(Self {
            chunker: Chunker::new(config)?,
            structure_strategy: ClassifierStrategy::CaseLength,
        })
    }

    /// Classifier used to tag blocks for the page structure
    pub fn with_structure_strategy(mut self, strategy: ClassifierStrategy) -> Self {
        self.structure_strategy = strategy;
        self
    }

    /// Build everything a document needs without touching the index
    pub fn prepare(
        &self,
        parsed: ParsedDocument,
        source_name: &str,
    ) -> Result<PreparedDocument, IngestionError> {
        let raw = parsed.into_raw_blocks();
        let mut normalized = normalize_blocks(&raw);
        if normalized.is_empty() {
            return Err(IngestionError::EmptyDocument(source_name.to_string()));
        }

        let model = DocumentModel::from_normalized(&normalized, &CaseLengthClassifier);

        tag_blocks(&mut normalized, classifier_for(self.structure_strategy).as_ref());
        let structure = build_page_structure(&normalized);

        let plan = self.chunker.build_chunks(&raw, source_name);

        Ok(PreparedDocument {
            document: LoadedDocument {
                source_name: source_name.to_string(),
                model,
                structure,
                chunk_count: plan.chunks.len(),
                mode: plan.mode,
                ingested_at: Utc::now(),
            },
            chunks: plan.chunks,
        })
    }

    /// Prepare `parsed` and make it the runtime's current document
    #[instrument(skip(self, runtime, parsed), fields(blocks = parsed.blocks.len()))]
    pub async fn ingest(
        &self,
        runtime: &Runtime,
        parsed: ParsedDocument,
        source_name: &str,
    ) -> Result<IngestionReport, IngestionError> {
        let start = Instant::now();

        let prepared = self.prepare(parsed, source_name)?;
        let loaded = runtime
            .replace_document(prepared.document, prepared.chunks)
            .await?;

        let report = IngestionReport::from_document(&loaded);
        let elapsed = start.elapsed();
        metrics::record_ingestion(elapsed.as_secs_f64(), report.chunk_count, report.mode.as_str());

        info!(
            source = %report.source_name,
            pages = report.page_count,
            chunks = report.chunk_count,
            mode = report.mode.as_str(),
            latency_ms = elapsed.as_millis() as u64,
            "Document ingested"
        );

        Ok(report)
    }
}
