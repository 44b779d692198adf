//! Flattened document model
//!
//! Built once per ingested document and never mutated afterwards. Feeds the
//! whole-document summary and the size-bounded chunking mode.

use super::{
    blocks::normalize_blocks, layout::classify_blocks, BlockClassifier, ClassifiedBlock,
    NormalizedBlock, RawBlock,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Block texts, page order then in-page order
    pub blocks: Vec<String>,

    /// Block texts per page number
    pub pages: BTreeMap<u32, Vec<String>>,

    /// Layout classification of `blocks`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<ClassifiedBlock>>,
}

impl DocumentModel {
    /// Normalize raw blocks and build the model
    pub fn from_raw_blocks(raw: &[RawBlock], classifier: &dyn BlockClassifier) -> Self {
        Self::from_normalized(&normalize_blocks(raw), classifier)
    }

    pub fn from_normalized(blocks: &[NormalizedBlock], classifier: &dyn BlockClassifier) -> Self {
        let mut pages: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for block in blocks {
            pages.entry(block.page).or_default().push(block.text.clone());
        }

        let flat: Vec<String> = pages.values().flatten().cloned().collect();
        let sections = classify_blocks(&flat, classifier);

        Self {
            blocks: flat,
            pages,
            sections: Some(sections),
        }
    }

    /// Non-blank block texts, trimmed
    pub fn clean_texts(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockType, CaseLengthClassifier};

    #[test]
    fn test_blocks_flattened_in_page_order() {
        let raw = vec![
            RawBlock::on_page("second page", 2),
            RawBlock::on_page("FIRST PAGE", 1),
            RawBlock::on_page("more second", 2),
            RawBlock::on_page("  ", 1),
        ];

        let model = DocumentModel::from_raw_blocks(&raw, &CaseLengthClassifier);
        assert_eq!(model.blocks, vec!["FIRST PAGE", "second page", "more second"]);
        assert_eq!(model.page_count(), 2);
        assert_eq!(model.pages[&2], vec!["second page", "more second"]);

        let sections = model.sections.as_ref().unwrap();
        assert_eq!(sections[0].block_type, BlockType::Heading);
        assert_eq!(sections[1].block_type, BlockType::ShortText);
    }

    #[test]
    fn test_bare_text_lands_on_page_one() {
        let raw = vec![RawBlock::text_only("loose line"), RawBlock::on_page("tagged", 3)];
        let model = DocumentModel::from_raw_blocks(&raw, &CaseLengthClassifier);
        assert_eq!(model.pages[&1], vec!["loose line"]);
        assert_eq!(model.blocks, vec!["loose line", "tagged"]);
    }

    #[test]
    fn test_empty_model() {
        let model = DocumentModel::from_raw_blocks(&[], &CaseLengthClassifier);
        assert!(model.is_empty());
        assert_eq!(model.clean_texts().count(), 0);
    }
}
