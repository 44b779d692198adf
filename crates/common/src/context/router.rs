//! Answer routing
//!
//! Routing is a pair of ordered rule tables:
//! - before classification, rules look only at the question text
//! - after classification, rules look only at the intent label
//!
//! Rules are evaluated top to bottom and the first one returning an action
//! wins. The classifier is only called when no pre-classification rule
//! fires, and retrieval runs at most once per question.

use super::citation::{format_citations, format_context};
use super::intent::{Intent, IntentClassifier};
use super::prompts;
use super::sufficiency::{is_meta_document_question, SufficiencyEvaluator};
use crate::config::AnsweringConfig;
use crate::document::{DocumentModel, RetrievedChunk};
use crate::errors::Result;
use crate::llm::Generator;
use crate::metrics;
use crate::retrieval::Retriever;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub const INVALID_QUESTION: &str = "Please ask a valid question.";
pub const NOT_FOUND: &str = "The requested information is not found in the document.";
pub const GENERAL_KNOWLEDGE_NOTE: &str = "General knowledge (not document-based)";
pub const ASSISTIVE_NOTE: &str = "General explanation inspired by document context";
pub const FALLBACK: &str = "I could not understand the request.";
pub const NO_READABLE_TEXT: &str = "No readable text was found in the document.";

/// Citation field of an answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Sources {
    /// Answer is not document-related; no sources field at all
    #[default]
    Omitted,
    /// Document was searched but nothing grounded the answer
    Empty,
    /// Rendered page list
    Cited(String),
}

impl Sources {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Sources::Omitted => None,
            Sources::Empty => Some(""),
            Sources::Cited(s) => Some(s),
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, Sources::Omitted)
    }
}

impl Serialize for Sources {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_none(),
        }
    }
}

/// Terminal state a question ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    InvalidQuestion,
    DocumentSummary,
    Chat,
    GeneralKnowledge,
    DocStrict,
    NotFound,
    DocAssistive,
    Fallback,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::InvalidQuestion => "invalid_question",
            Route::DocumentSummary => "document_summary",
            Route::Chat => "chat",
            Route::GeneralKnowledge => "general_knowledge",
            Route::DocStrict => "doc_strict",
            Route::NotFound => "not_found",
            Route::DocAssistive => "doc_assistive",
            Route::Fallback => "fallback",
        }
    }
}

/// Final answer for one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub answer: String,

    #[serde(skip_serializing_if = "Sources::is_omitted")]
    pub sources: Sources,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub route: Route,
}

impl AnswerResult {
    fn new(route: Route, answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Sources::Omitted,
            note: None,
            route,
        }
    }

    fn with_sources(mut self, sources: Sources) -> Self {
        self.sources = sources;
        self
    }

    fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Reject,
    Summarize,
    Answer(Intent),
    Fallback,
}

/// One row of a routing table; `apply` sees the question or the label
struct Rule {
    name: &'static str,
    apply: fn(&str) -> Option<Action>,
}

fn reject_empty(question: &str) -> Option<Action> {
    question.is_empty().then_some(Action::Reject)
}

fn summarize_meta(question: &str) -> Option<Action> {
    is_meta_document_question(question).then_some(Action::Summarize)
}

fn known_intent(label: &str) -> Option<Action> {
    label.parse::<Intent>().ok().map(Action::Answer)
}

fn default_to_doc_strict(label: &str) -> Option<Action> {
    warn!(label, "Unrecognized intent label, defaulting to DOC_STRICT");
    Some(Action::Answer(Intent::DocStrict))
}

const QUESTION_RULES: &[Rule] = &[
    Rule {
        name: "empty_question",
        apply: reject_empty,
    },
    Rule {
        name: "meta_document",
        apply: summarize_meta,
    },
];

const LABEL_RULES: &[Rule] = &[
    Rule {
        name: "known_intent",
        apply: known_intent,
    },
    Rule {
        name: "unknown_label",
        apply: default_to_doc_strict,
    },
];

/// Turns a question into an [`AnswerResult`]
///
/// Built once per process. Capability errors propagate unchanged; the router
/// never retries and never turns a failure into an answer.
#[derive(Clone)]
pub struct AnswerRouter {
    classifier: IntentClassifier,
    fast: Arc<dyn Generator>,
    main: Arc<dyn Generator>,
    retriever: Retriever,
    evaluator: SufficiencyEvaluator,
    summary_max_blocks: usize,
}

impl AnswerRouter {
    /// `fast` serves classification, chat and explanations; `main` serves
    /// grounded answers and summaries
    pub fn new(
        fast: Arc<dyn Generator>,
        main: Arc<dyn Generator>,
        retriever: Retriever,
        config: &AnsweringConfig,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(fast.clone()),
            fast,
            main,
            retriever,
            evaluator: SufficiencyEvaluator::new(config.min_context_chars),
            summary_max_blocks: config.summary_max_blocks,
        }
    }

    #[instrument(skip(self, document), fields(route = tracing::field::Empty))]
    pub async fn answer(
        &self,
        question: &str,
        document: Option<&DocumentModel>,
    ) -> Result<AnswerResult> {
        let start = Instant::now();
        let question = question.trim();

        let result = match self.decide(question).await? {
            Action::Reject => AnswerResult::new(Route::InvalidQuestion, INVALID_QUESTION),
            Action::Summarize => self.summarize(document).await?,
            Action::Answer(intent) => self.answer_with(intent, question).await?,
            Action::Fallback => AnswerResult::new(Route::Fallback, FALLBACK),
        };

        tracing::Span::current().record("route", result.route.as_str());
        metrics::record_question(result.route.as_str());
        info!(
            route = result.route.as_str(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Question answered"
        );

        Ok(result)
    }

    async fn decide(&self, question: &str) -> Result<Action> {
        for rule in QUESTION_RULES {
            if let Some(action) = (rule.apply)(question) {
                debug!(rule = rule.name, ?action, "Question rule matched");
                return Ok(action);
            }
        }

        let label = self.classifier.classify(question).await?;
        for rule in LABEL_RULES {
            if let Some(action) = (rule.apply)(&label) {
                debug!(rule = rule.name, ?action, "Label rule matched");
                return Ok(action);
            }
        }

        Ok(Action::Fallback)
    }

    async fn answer_with(&self, intent: Intent, question: &str) -> Result<AnswerResult> {
        let retrieved = if intent.needs_retrieval() {
            self.retriever.retrieve(question).await?
        } else {
            Vec::new()
        };

        match intent {
            Intent::Chat => {
                let answer = self.fast.generate(question).await?;
                Ok(AnswerResult::new(Route::Chat, answer))
            }
            Intent::GeneralKnowledge => {
                let answer = self.fast.generate(question).await?;
                Ok(AnswerResult::new(Route::GeneralKnowledge, answer).with_note(GENERAL_KNOWLEDGE_NOTE))
            }
            Intent::DocStrict => self.grounded(question, &retrieved).await,
            Intent::DocAssistive => {
                let answer = self.fast.generate(&prompts::assistive_prompt(question)).await?;
                Ok(AnswerResult::new(Route::DocAssistive, answer)
                    .with_sources(Sources::Cited(format_citations(&retrieved)))
                    .with_note(ASSISTIVE_NOTE))
            }
        }
    }

    async fn grounded(&self, question: &str, retrieved: &[RetrievedChunk]) -> Result<AnswerResult> {
        let verdict = self.evaluator.evaluate(question, retrieved);
        if !verdict.is_sufficient() {
            debug!(?verdict, "Context insufficient, skipping generation");
            return Ok(AnswerResult::new(Route::NotFound, NOT_FOUND).with_sources(Sources::Empty));
        }

        let prompt = prompts::grounded_prompt(&format_context(retrieved), question);
        let answer = self.main.generate(&prompt).await?;

        Ok(AnswerResult::new(Route::DocStrict, answer)
            .with_sources(Sources::Cited(format_citations(retrieved))))
    }

    async fn summarize(&self, document: Option<&DocumentModel>) -> Result<AnswerResult> {
        let texts: Vec<&str> = document
            .map(|d| d.clean_texts().take(self.summary_max_blocks).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            return Ok(AnswerResult::new(Route::DocumentSummary, NO_READABLE_TEXT));
        }

        let answer = self
            .main
            .generate(&prompts::summary_prompt(&texts.join("\n")))
            .await?;
        Ok(AnswerResult::new(Route::DocumentSummary, answer))
    }
}
