//! Block normalization
//!
//! Turns raw optical-extraction output into clean, identified blocks.
//! Entries whose text is missing or blank are OCR noise and are dropped.

use super::{BlockType, NormalizedBlock, RawBlock};
use tracing::debug;
use uuid::Uuid;

/// Collapse internal whitespace runs to single spaces and trim
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize raw blocks, preserving their order
pub fn normalize_blocks(raw: &[RawBlock]) -> Vec<NormalizedBlock> {
    let normalized: Vec<NormalizedBlock> = raw
        .iter()
        .filter_map(|block| {
            let text = clean_text(block.text.as_deref().unwrap_or_default());
            if text.is_empty() {
                return None;
            }

            Some(NormalizedBlock {
                id: Uuid::new_v4(),
                text,
                bbox: block.bbox,
                page: block.page.unwrap_or(1),
                confidence: scale_confidence(block.confidence),
                block_type: BlockType::Unknown,
            })
        })
        .collect();

    debug!(
        input = raw.len(),
        kept = normalized.len(),
        "Blocks normalized"
    );

    normalized
}

/// OCR engines report 0-100 (and -1 for non-text rows)
fn scale_confidence(confidence: Option<f32>) -> f32 {
    confidence
        .map(|c| (c / 100.0).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}
