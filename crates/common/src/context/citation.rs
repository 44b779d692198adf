//! Citation and context rendering for retrieved chunks

use crate::document::RetrievedChunk;
use std::collections::BTreeSet;

/// Rendered when no retrieved chunk carries a page
pub const NO_SOURCES: &str = "No sources found";

/// `"Pages: 1, 4, 7"` from the distinct pages of `chunks`, ascending
pub fn format_citations(chunks: &[RetrievedChunk]) -> String {
    let pages: BTreeSet<u32> = chunks.iter().filter_map(|c| c.page()).collect();

    if pages.is_empty() {
        return NO_SOURCES.to_string();
    }

    let list: Vec<String> = pages.iter().map(u32::to_string).collect();
    format!("Pages: {}", list.join(", "))
}

/// Context block for the grounded prompt, in retrieval order
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| {
            let page = c
                .page()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!("[Source: {}, Page: {}]\n{}", c.source(), page, c.content())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;

    fn chunk(page: Option<u32>, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: Chunk::new(content, page, "scan.pdf"),
            rank: 0,
            score: None,
        }
    }

    #[test]
    fn test_pages_deduplicated_and_sorted() {
        let chunks = vec![
            chunk(Some(7), "a"),
            chunk(Some(2), "b"),
            chunk(None, "c"),
            chunk(Some(7), "d"),
            chunk(Some(10), "e"),
        ];
        assert_eq!(format_citations(&chunks), "Pages: 2, 7, 10");
    }

    #[test]
    fn test_order_independent_and_idempotent() {
        let mut chunks = vec![chunk(Some(3), "a"), chunk(Some(1), "b"), chunk(Some(2), "c")];
        let first = format_citations(&chunks);
        assert_eq!(format_citations(&chunks), first);

        chunks.reverse();
        assert_eq!(format_citations(&chunks), first);
    }

    #[test]
    fn test_no_pages() {
        assert_eq!(format_citations(&[]), NO_SOURCES);
        assert_eq!(format_citations(&[chunk(None, "x")]), NO_SOURCES);
    }

    #[test]
    fn test_context_blocks() {
        let context = format_context(&[chunk(Some(1), "first"), chunk(None, "second")]);
        assert_eq!(
            context,
            "[Source: scan.pdf, Page: 1]\nfirst\n\n[Source: scan.pdf, Page: N/A]\nsecond"
        );
    }
}
