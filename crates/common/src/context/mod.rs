//! Query engine
//!
//! Everything between a question and its answer:
//! - Intent classification
//! - Context sufficiency heuristics
//! - Citation and context rendering
//! - Answer routing

mod citation;
mod intent;
mod prompts;
mod router;
mod sufficiency;

pub use citation::{format_citations, format_context, NO_SOURCES};
pub use intent::{Intent, IntentClassifier, UnknownIntent};
pub use router::{
    AnswerResult, AnswerRouter, Route, Sources, ASSISTIVE_NOTE, FALLBACK, GENERAL_KNOWLEDGE_NOTE,
    INVALID_QUESTION, NOT_FOUND, NO_READABLE_TEXT,
};
pub use sufficiency::{
    is_context_sufficient, is_meta_document_question, question_terms, SufficiencyEvaluator,
    Verdict,
};
