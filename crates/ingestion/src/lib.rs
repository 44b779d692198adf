//! Pagewise ingestion
//!
//! Parsed document in, retrieval-ready chunks and page structure out:
//! - Chunking (page-aware flush, size-bounded packing, recursive splitting)
//! - The ingestion boundary that loads a document into the runtime
//! - JSON export of the page structure and chunks

pub mod chunker;
pub mod errors;
pub mod exporter;
pub mod processor;
pub mod splitter;

pub use chunker::{ChunkPlan, Chunker};
pub use errors::IngestionError;
pub use exporter::export_json;
pub use processor::{DocumentIngestor, IngestionReport, PreparedDocument};
pub use splitter::RecursiveSplitter;
