//! Context sufficiency heuristics
//!
//! Decides whether retrieved chunks plausibly ground an answer. Word-level
//! only: no embeddings, no model calls. Rules are checked in a fixed order
//! and the first one that decides wins.

use crate::document::RetrievedChunk;
use crate::metrics;
use std::collections::HashSet;
use tracing::debug;

const DOCUMENT_REFERENCES: &[&str] = &[
    "document", "file", "pdf", "assignment", "report", "notes", "attached", "this",
];

const OVERVIEW_VERBS: &[&str] = &["about", "describe", "summarize", "explain", "overview", "tell", "what"];

const STOPWORDS: &[&str] = &[
    "what", "is", "the", "of", "a", "an", "to", "in", "on", "for", "and", "or", "about", "based",
    "does", "do",
];

/// Lowercase words with surrounding punctuation stripped
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
}

/// Question about the document as a whole ("what is this document about")
pub fn is_meta_document_question(question: &str) -> bool {
    let words: HashSet<String> = words(question).collect();
    DOCUMENT_REFERENCES.iter().any(|w| words.contains(*w))
        && OVERVIEW_VERBS.iter().any(|w| words.contains(*w))
}

/// Question words that carry content: no stopwords, longer than 2 chars
pub fn question_terms(question: &str) -> HashSet<String> {
    words(question)
        .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Which rule decided, and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NoChunks,
    MetaQuestion,
    TooLittleText,
    NoQuestionTerms,
    TermOverlap,
    NoTermOverlap,
}

impl Verdict {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Verdict::MetaQuestion | Verdict::TermOverlap)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SufficiencyEvaluator {
    min_chars: usize,
}

impl Default for SufficiencyEvaluator {
    fn default() -> Self {
        Self { min_chars: 50 }
    }
}

impl SufficiencyEvaluator {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    pub fn evaluate(&self, question: &str, chunks: &[RetrievedChunk]) -> Verdict {
        let verdict = self.decide(question, chunks);
        metrics::record_sufficiency(verdict.is_sufficient());
        debug!(?verdict, chunks = chunks.len(), "Context sufficiency evaluated");
        verdict
    }

    fn decide(&self, question: &str, chunks: &[RetrievedChunk]) -> Verdict {
        if chunks.is_empty() {
            return Verdict::NoChunks;
        }

        if is_meta_document_question(question) {
            return Verdict::MetaQuestion;
        }

        let total: usize = chunks
            .iter()
            .map(|c| c.content().trim().chars().count())
            .sum();
        if total < self.min_chars {
            return Verdict::TooLittleText;
        }

        let terms = question_terms(question);
        if terms.is_empty() {
            return Verdict::NoQuestionTerms;
        }

        let overlaps = chunks
            .iter()
            .any(|c| words(c.content()).any(|w| terms.contains(&w)));
        if overlaps {
            Verdict::TermOverlap
        } else {
            Verdict::NoTermOverlap
        }
    }
}

pub fn is_context_sufficient(question: &str, chunks: &[RetrievedChunk], min_chars: usize) -> bool {
    SufficiencyEvaluator::new(min_chars)
        .evaluate(question, chunks)
        .is_sufficient()
}
