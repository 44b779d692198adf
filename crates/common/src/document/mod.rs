//! Document model
//!
//! Everything between raw optical-extraction output and retrieval units:
//! - Block normalization
//! - Layout classification (two independent strategies)
//! - Page/section structuring
//! - The flattened document model used for whole-document summaries

mod blocks;
mod layout;
mod model;
mod structure;

pub use blocks::{clean_text, normalize_blocks};
pub use layout::{
    classifier_for, classify_blocks, tag_blocks, BlockClassifier, CaseLengthClassifier,
    ClassifierStrategy, DigitSignalClassifier,
};
pub use model::DocumentModel;
pub use structure::{build_page_structure, Section, StructuredPage};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Axis-aligned box `[x0, y0, x1, y1]` in page pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x0, y0, x1, y1]: [f32; 4]) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// One unit of optical-extraction output, as produced by the OCR stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    /// Extracted text; entries without text are dropped during normalization
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub bbox: Option<BoundingBox>,

    /// 1-based page number
    #[serde(default)]
    pub page: Option<u32>,

    /// Extraction confidence on the 0-100 scale
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl RawBlock {
    /// Block carrying only text, as found in free-form block lists
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn on_page(text: impl Into<String>, page: u32) -> Self {
        Self {
            text: Some(text.into()),
            page: Some(page),
            ..Default::default()
        }
    }
}

/// Entry of a parsed document's `blocks` array
///
/// Parsed documents come either as rich block objects or as bare strings.
/// Both shapes are resolved into [`RawBlock`] once, by
/// [`ParsedDocument::into_raw_blocks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentBlock {
    Text(String),
    Block(RawBlock),
}

impl From<DocumentBlock> for RawBlock {
    fn from(block: DocumentBlock) -> Self {
        match block {
            DocumentBlock::Text(text) => RawBlock::text_only(text),
            DocumentBlock::Block(raw) => raw,
        }
    }
}

/// Parsed document as accepted by the ingestion boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    #[serde(default)]
    pub blocks: Vec<DocumentBlock>,
}

impl ParsedDocument {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_raw_blocks(self) -> Vec<RawBlock> {
        self.blocks.into_iter().map(RawBlock::from).collect()
    }
}

/// Layout role of a block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Unknown,
    Heading,
    ShortText,
    Paragraph,
    KeyValue,
    Footer,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Unknown => "unknown",
            BlockType::Heading => "heading",
            BlockType::ShortText => "short_text",
            BlockType::Paragraph => "paragraph",
            BlockType::KeyValue => "key_value",
            BlockType::Footer => "footer",
        }
    }
}

/// Cleaned block with identity and layout role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBlock {
    pub id: Uuid,

    /// Whitespace-collapsed, never empty
    pub text: String,

    pub bbox: Option<BoundingBox>,

    pub page: u32,

    /// Confidence scaled to [0, 1]
    pub confidence: f32,

    pub block_type: BlockType,
}

/// Block text with its layout classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedBlock {
    pub text: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
}

/// How chunk page numbers were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceMode {
    /// Every block carried its page; citations are exact
    PageAware,
    /// Pages derived from chunk emission order; citations are approximate
    Synthetic,
}

impl ProvenanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvenanceMode::PageAware => "page_aware",
            ProvenanceMode::Synthetic => "synthetic",
        }
    }
}

/// Retrieval unit with page provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,

    /// Page the content came from; synthetic when ingested without page metadata
    pub source_page: Option<u32>,

    pub source_name: String,
}

impl Chunk {
    pub fn new(content: impl Into<String>, source_page: Option<u32>, source_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_page,
            source_name: source_name.into(),
        }
    }

    /// Stable content hash, used to de-duplicate identical chunks
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.source_page.unwrap_or(0).to_le_bytes());
        hasher.update(self.content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Chunk returned by the vector index for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,

    /// 0-based position in the result list (0 is most relevant)
    pub rank: usize,

    /// Similarity reported by the index, when it exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl RetrievedChunk {
    pub fn content(&self) -> &str {
        &self.chunk.content
    }

    pub fn page(&self) -> Option<u32> {
        self.chunk.source_page
    }

    pub fn source(&self) -> &str {
        &self.chunk.source_name
    }
}
