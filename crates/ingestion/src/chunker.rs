//! Text chunking module
//!
//! Turns parsed blocks into retrieval units. Two first-stage policies:
//! - page-aware flush: one chunk per page, prefixed with a page marker
//! - size-bounded accumulation: blocks packed up to the chunk size, with
//!   page numbers derived from emission order
//!
//! Either way the result goes through the recursive splitter, and split
//! pieces keep the page and source of the chunk they came from.

use crate::errors::IngestionError;
use crate::splitter::RecursiveSplitter;
use pagewise_common::config::ChunkingConfig;
use pagewise_common::document::{Chunk, ProvenanceMode, RawBlock};
use tracing::{debug, warn};

/// Chunks of one document and how their pages were obtained
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    pub chunks: Vec<Chunk>,
    pub mode: ProvenanceMode,
}

pub struct Chunker {
    config: ChunkingConfig,
    splitter: RecursiveSplitter,
}

impl Chunker {
    pub fn new(config: &ChunkingConfig) -> Result<Self, IngestionError> {
        Ok(Self {
            splitter: RecursiveSplitter::new(config.chunk_size, config.chunk_overlap)?,
            config: config.clone(),
        })
    }

    /// Pick a provenance mode and produce the final chunks
    pub fn build_chunks(&self, blocks: &[RawBlock], source_name: &str) -> ChunkPlan {
        let texts: Vec<(&str, Option<u32>)> = blocks
            .iter()
            .filter_map(|b| {
                let text = b.text.as_deref().unwrap_or_default().trim();
                (!text.is_empty()).then_some((text, b.page))
            })
            .collect();

        let mode = if !texts.is_empty() && texts.iter().all(|(_, page)| page.is_some()) {
            ProvenanceMode::PageAware
        } else {
            ProvenanceMode::Synthetic
        };

        let first_stage = match mode {
            ProvenanceMode::PageAware => self.page_chunks(&texts, source_name),
            ProvenanceMode::Synthetic => {
                if !texts.is_empty() {
                    warn!(
                        source = source_name,
                        "Blocks without page numbers, citation pages will be approximate"
                    );
                }
                let plain: Vec<&str> = texts.iter().map(|(text, _)| *text).collect();
                self.sized_chunks(&plain, source_name)
            }
        };

        let chunks = self.split_chunks(first_stage);
        debug!(
            source = source_name,
            mode = mode.as_str(),
            chunks = chunks.len(),
            "Document chunked"
        );

        ChunkPlan { chunks, mode }
    }

    /// One chunk per page run of blocks
    ///
    /// A page is flushed when the page number changes, and kept only when its
    /// text is longer than `page_flush_min_chars`. The trailing page uses the
    /// lower `final_flush_min_chars` bound.
    pub fn page_chunks(&self, blocks: &[(&str, Option<u32>)], source_name: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut current_page: Option<u32> = None;

        for &(text, page) in blocks {
            if !buffer.is_empty() && page != current_page {
                self.flush_page(
                    &mut chunks,
                    &buffer,
                    current_page,
                    source_name,
                    self.config.page_flush_min_chars,
                );
                buffer.clear();
            }

            current_page = page;
            buffer.push(text);
        }

        if !buffer.is_empty() {
            self.flush_page(
                &mut chunks,
                &buffer,
                current_page,
                source_name,
                self.config.final_flush_min_chars,
            );
        }

        chunks
    }

    fn flush_page(
        &self,
        chunks: &mut Vec<Chunk>,
        buffer: &[&str],
        page: Option<u32>,
        source_name: &str,
        min_chars: usize,
    ) {
        let combined = buffer.join(" ");
        let combined = combined.trim();

        if combined.chars().count() <= min_chars {
            debug!(?page, length = combined.chars().count(), "Page text too short, skipped");
            return;
        }

        let content = match page {
            Some(p) => format!("[Page {}]\n{}", p, combined),
            None => combined.to_string(),
        };
        chunks.push(Chunk::new(content, page, source_name));
    }

    /// Blocks packed into chunks of at most `chunk_size` characters
    ///
    /// Every `synthetic_page_stride` chunks share one synthetic page number.
    pub fn sized_chunks(&self, texts: &[&str], source_name: &str) -> Vec<Chunk> {
        let mut packed: Vec<String> = Vec::new();
        let mut current = String::new();

        for text in texts {
            if current.chars().count() + text.chars().count() <= self.config.chunk_size {
                current.push(' ');
                current.push_str(text);
            } else {
                let finished = current.trim();
                if !finished.is_empty() {
                    packed.push(finished.to_string());
                }
                current = text.to_string();
            }
        }

        let finished = current.trim();
        if !finished.is_empty() {
            packed.push(finished.to_string());
        }

        let stride = self.config.synthetic_page_stride.max(1);
        packed
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk::new(content, Some((i / stride) as u32 + 1), source_name))
            .collect()
    }

    /// Subdivide chunks with the recursive splitter
    ///
    /// A page marker split off on its own carries no text and is dropped.
    pub fn split_chunks(&self, chunks: Vec<Chunk>) -> Vec<Chunk> {
        chunks
            .into_iter()
            .flat_map(|chunk| {
                self.splitter
                    .split(&chunk.content)
                    .into_iter()
                    .filter(|piece| !is_page_marker(piece, chunk.source_page))
                    .map(|piece| Chunk::new(piece, chunk.source_page, chunk.source_name.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

fn is_page_marker(piece: &str, page: Option<u32>) -> bool {
    page.is_some_and(|p| piece.trim() == format!("[Page {}]", p))
}
