//! Page and section structuring
//!
//! Groups classified blocks by page, orders each page top to bottom by the
//! bounding box's vertical origin, and splits it into sections at heading
//! blocks. Only paragraph and footer blocks carry content; other roles are
//! treated as layout noise.

use super::{BlockType, NormalizedBlock};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: Option<String>,
    pub blocks: Vec<NormalizedBlock>,
}

impl Section {
    fn open(heading: Option<String>) -> Self {
        Self {
            heading,
            blocks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPage {
    pub page: u32,
    pub sections: Vec<Section>,
}

/// Build the page/section structure, pages ascending
pub fn build_page_structure(blocks: &[NormalizedBlock]) -> Vec<StructuredPage> {
    let mut pages: BTreeMap<u32, Vec<&NormalizedBlock>> = BTreeMap::new();
    for block in blocks {
        pages.entry(block.page).or_default().push(block);
    }

    pages
        .into_iter()
        .map(|(page, mut page_blocks)| {
            // Stable: blocks without a box keep extraction order after boxed ones
            page_blocks.sort_by(|a, b| reading_order(a, b));
            StructuredPage {
                page,
                sections: split_sections(&page_blocks),
            }
        })
        .collect()
}

fn reading_order(a: &NormalizedBlock, b: &NormalizedBlock) -> Ordering {
    match (a.bbox, b.bbox) {
        (Some(x), Some(y)) => x.y0.total_cmp(&y.y0),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn split_sections(page_blocks: &[&NormalizedBlock]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::open(None);

    for block in page_blocks {
        match block.block_type {
            BlockType::Heading => {
                let finished = std::mem::replace(&mut current, Section::open(Some(block.text.clone())));
                if !finished.blocks.is_empty() {
                    sections.push(finished);
                }
            }
            BlockType::Paragraph | BlockType::Footer => current.blocks.push((*block).clone()),
            _ => {}
        }
    }

    if !current.blocks.is_empty() {
        sections.push(current);
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BoundingBox;
    use uuid::Uuid;

    fn block(text: &str, block_type: BlockType, page: u32, y: f32) -> NormalizedBlock {
        NormalizedBlock {
            id: Uuid::new_v4(),
            text: text.to_string(),
            bbox: Some(BoundingBox::from([0.0, y, 100.0, y + 10.0])),
            page,
            confidence: 0.9,
            block_type,
        }
    }

    fn texts(section: &Section) -> Vec<&str> {
        section.blocks.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_sections_split_at_headings() {
        let blocks = vec![
            block("A", BlockType::Heading, 1, 0.0),
            block("x", BlockType::Paragraph, 1, 10.0),
            block("y", BlockType::Paragraph, 1, 20.0),
            block("B", BlockType::Heading, 1, 30.0),
            block("z", BlockType::Paragraph, 1, 40.0),
        ];

        let pages = build_page_structure(&blocks);
        assert_eq!(pages.len(), 1);
        let sections = &pages[0].sections;
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading.as_deref(), Some("A"));
        assert_eq!(texts(&sections[0]), vec!["x", "y"]);
        assert_eq!(sections[1].heading.as_deref(), Some("B"));
        assert_eq!(texts(&sections[1]), vec!["z"]);
    }

    #[test]
    fn test_page_without_headings() {
        let blocks = vec![
            block("x", BlockType::Paragraph, 1, 0.0),
            block("y", BlockType::Footer, 1, 90.0),
        ];
        let pages = build_page_structure(&blocks);
        assert_eq!(pages[0].sections.len(), 1);
        assert_eq!(pages[0].sections[0].heading, None);
        assert_eq!(texts(&pages[0].sections[0]), vec!["x", "y"]);
    }

    #[test]
    fn test_page_with_only_noise_has_no_sections() {
        let blocks = vec![
            block("Fig 1", BlockType::ShortText, 3, 0.0),
            block("Total: 12", BlockType::KeyValue, 3, 5.0),
        ];
        let pages = build_page_structure(&blocks);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page, 3);
        assert!(pages[0].sections.is_empty());
    }

    #[test]
    fn test_empty_heading_sections_dropped() {
        let blocks = vec![
            block("FIRST", BlockType::Heading, 1, 0.0),
            block("SECOND", BlockType::Heading, 1, 10.0),
            block("body", BlockType::Paragraph, 1, 20.0),
            block("TRAILING", BlockType::Heading, 1, 30.0),
        ];
        let sections = &build_page_structure(&blocks)[0].sections;
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading.as_deref(), Some("SECOND"));
    }

    #[test]
    fn test_vertical_order_overrides_extraction_order() {
        let blocks = vec![
            block("z", BlockType::Paragraph, 1, 50.0),
            block("B", BlockType::Heading, 1, 40.0),
            block("x", BlockType::Paragraph, 1, 10.0),
            block("A", BlockType::Heading, 1, 0.0),
        ];
        let sections = &build_page_structure(&blocks)[0].sections;
        assert_eq!(sections[0].heading.as_deref(), Some("A"));
        assert_eq!(texts(&sections[0]), vec!["x"]);
        assert_eq!(sections[1].heading.as_deref(), Some("B"));
        assert_eq!(texts(&sections[1]), vec!["z"]);
    }

    #[test]
    fn test_pages_sorted_ascending() {
        let blocks = vec![
            block("p3", BlockType::Paragraph, 3, 0.0),
            block("p1", BlockType::Paragraph, 1, 0.0),
            block("p2", BlockType::Paragraph, 2, 0.0),
        ];
        let pages: Vec<u32> = build_page_structure(&blocks).iter().map(|p| p.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn test_unboxed_blocks_follow_boxed_ones() {
        let mut unboxed = block("late", BlockType::Paragraph, 1, 0.0);
        unboxed.bbox = None;
        let blocks = vec![unboxed, block("early", BlockType::Paragraph, 1, 500.0)];
        let sections = &build_page_structure(&blocks)[0].sections;
        assert_eq!(texts(&sections[0]), vec!["early", "late"]);
    }
}
