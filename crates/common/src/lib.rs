//! Pagewise Common Library
//!
//! Shared code for all Pagewise binaries including:
//! - Document model (normalization, layout classification, page structure)
//! - Capability abstractions (embedding, vector index, text generation)
//! - The query engine (intent, sufficiency, citations, answer routing)
//! - Error types and handling
//! - Configuration management
//! - Metrics, logging and observability

pub mod config;
pub mod context;
pub mod document;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod retrieval;
pub mod runtime;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use context::{AnswerResult, AnswerRouter, Intent, Sources};
pub use document::{
    Chunk, DocumentModel, NormalizedBlock, ProvenanceMode, RawBlock, RetrievedChunk, StructuredPage,
};
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use llm::Generator;
pub use retrieval::{Retriever, VectorIndex};
pub use runtime::{LoadedDocument, Runtime};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 5;

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 500;
