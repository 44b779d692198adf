//! Recursive separator splitter
//!
//! Splits text on the coarsest separator present (paragraph break, line
//! break, period, space, then single characters), recursing into pieces that
//! are still too long, and merges small pieces back up to the chunk size with
//! a trailing overlap carried into the next chunk.
//!
//! Separators stay attached to the start of the piece that follows them.
//! Lengths are counted in characters.

use crate::errors::IngestionError;
use std::collections::VecDeque;
use tracing::warn;

pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ".", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, IngestionError> {
        if chunk_size == 0 {
            return Err(IngestionError::InvalidChunking(
                "chunk_size must be positive".to_string(),
            ));
        }
        if chunk_overlap > chunk_size {
            return Err(IngestionError::InvalidChunking(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into trimmed, non-empty pieces
    pub fn split(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        self.split_with(text, &separators)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or_default();
        let mut finer: &[&str] = &[];
        for (i, &candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }

            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        length = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than the configured size"
                    );
                }

                if !window.is_empty() {
                    push_joined(&mut merged, &window);

                    while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                        match window.pop_front() {
                            Some((_, dropped)) => total -= dropped,
                            None => break,
                        }
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_joined(&mut merged, &window);
        merged
    }
}

fn push_joined(out: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split on `separator`, keeping it at the start of the following piece
///
/// An empty separator splits into single characters. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    pieces.push(&text[start..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}
