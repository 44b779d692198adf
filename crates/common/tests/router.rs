//! Answer router behaviour against scripted capabilities

use async_trait::async_trait;
use pagewise_common::config::AnsweringConfig;
use pagewise_common::context::{
    AnswerRouter, Route, Sources, ASSISTIVE_NOTE, GENERAL_KNOWLEDGE_NOTE, INVALID_QUESTION,
    NOT_FOUND,
};
use pagewise_common::document::CaseLengthClassifier;
use pagewise_common::embeddings::HashingEmbedder;
use pagewise_common::retrieval::InMemoryIndex;
use pagewise_common::{
    AppError, Chunk, DocumentModel, Generator, RawBlock, Result, RetrievedChunk, Retriever,
    VectorIndex,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

const INTENT_MARKER: &str = "Return ONLY the intent name";

/// Replies with a fixed label to classification prompts and echoes otherwise
struct ScriptedGenerator {
    label: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn classifier_calls(&self) -> usize {
        self.prompts()
            .iter()
            .filter(|p| p.contains(INTENT_MARKER))
            .count()
    }

    fn answer_calls(&self) -> usize {
        self.prompts().len() - self.classifier_calls()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains(INTENT_MARKER) {
            Ok(format!(" {}\n", self.label))
        } else {
            Ok(format!("generated ({} chars of prompt)", prompt.len()))
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct Unavailable;

#[async_trait]
impl Generator for Unavailable {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(AppError::GenerationError {
            message: "connection refused".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "unavailable"
    }
}

/// Counts searches made against an in-memory index
struct CountingIndex {
    inner: InMemoryIndex,
    searches: AtomicUsize,
}

impl CountingIndex {
    async fn with_chunks(chunks: Vec<Chunk>) -> Arc<Self> {
        let index = Self {
            inner: InMemoryIndex::new(Arc::new(HashingEmbedder::new(256))),
            searches: AtomicUsize::new(0),
        };
        index.inner.reindex(chunks).await.unwrap();
        Arc::new(index)
    }

    fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for CountingIndex {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query, k).await
    }

    async fn reindex(&self, chunks: Vec<Chunk>) -> Result<usize> {
        self.inner.reindex(chunks).await
    }

    async fn chunk_count(&self) -> usize {
        self.inner.chunk_count().await
    }
}

/// Index whose searches always fail
#[derive(Default)]
struct BrokenIndex {
    searches: AtomicUsize,
}

#[async_trait]
impl VectorIndex for BrokenIndex {
    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<RetrievedChunk>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Err(AppError::RetrievalError {
            message: "index offline".to_string(),
        })
    }

    async fn reindex(&self, chunks: Vec<Chunk>) -> Result<usize> {
        Ok(chunks.len())
    }

    async fn chunk_count(&self) -> usize {
        0
    }
}

fn invoice_chunks() -> Vec<Chunk> {
    vec![
        Chunk::new(
            "[Page 1]\nINVOICE 2024-117 issued by Northwind Traders to Contoso Ltd.",
            Some(1),
            "invoice.pdf",
        ),
        Chunk::new(
            "[Page 2]\nThe invoice total is 420 euros, payable within thirty days.",
            Some(2),
            "invoice.pdf",
        ),
    ]
}

fn document() -> DocumentModel {
    DocumentModel::from_raw_blocks(
        &[
            RawBlock::on_page("INVOICE 2024-117", 1),
            RawBlock::on_page("Northwind Traders bills Contoso Ltd.", 1),
            RawBlock::on_page("Total: 420 euros", 2),
        ],
        &CaseLengthClassifier,
    )
}

struct Harness {
    fast: Arc<ScriptedGenerator>,
    main: Arc<ScriptedGenerator>,
    index: Arc<CountingIndex>,
    router: AnswerRouter,
}

async fn harness(label: &str, chunks: Vec<Chunk>) -> Harness {
    let fast = ScriptedGenerator::new(label);
    let main = ScriptedGenerator::new(label);
    let index = CountingIndex::with_chunks(chunks).await;
    let router = AnswerRouter::new(
        fast.clone(),
        main.clone(),
        Retriever::new(index.clone(), 5),
        &AnsweringConfig::default(),
    );

    Harness {
        fast,
        main,
        index,
        router,
    }
}

#[tokio::test]
async fn blank_questions_make_no_capability_calls() {
    let h = harness("DOC_STRICT", invoice_chunks()).await;

    for question in ["", "   ", "\n\t "] {
        let result = assert_ok!(h.router.answer(question, Some(&document())).await);
        assert_eq!(result.answer, INVALID_QUESTION);
        assert_eq!(result.route, Route::InvalidQuestion);
        assert_eq!(result.sources, Sources::Omitted);
    }

    assert!(h.fast.prompts().is_empty());
    assert!(h.main.prompts().is_empty());
    assert_eq!(h.index.searches(), 0);
}

#[tokio::test]
async fn meta_questions_skip_the_classifier_and_summarize() {
    let h = harness("CHAT", invoice_chunks()).await;

    let result = assert_ok!(
        h.router
            .answer("What is this document about?", Some(&document()))
            .await
    );

    assert_eq!(result.route, Route::DocumentSummary);
    assert_eq!(h.fast.classifier_calls(), 0);
    assert_eq!(h.index.searches(), 0);

    let prompts = h.main.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Summarize the following document content."));
    assert!(prompts[0].ends_with("INVOICE 2024-117\nNorthwind Traders bills Contoso Ltd.\nTotal: 420 euros"));
}

#[tokio::test]
async fn summary_is_capped_at_configured_block_count() {
    let fast = ScriptedGenerator::new("CHAT");
    let main = ScriptedGenerator::new("CHAT");
    let index = CountingIndex::with_chunks(Vec::new()).await;
    let config = AnsweringConfig {
        summary_max_blocks: 2,
        ..Default::default()
    };
    let router = AnswerRouter::new(fast, main.clone(), Retriever::new(index, 5), &config);

    assert_ok!(router.answer("summarize this report", Some(&document())).await);
    let prompt = &main.prompts()[0];
    assert!(prompt.contains("Northwind Traders"));
    assert!(!prompt.contains("Total: 420 euros"));
}

#[tokio::test]
async fn insufficient_context_returns_not_found_without_generation() {
    let h = harness("DOC_STRICT", invoice_chunks()).await;

    let result = assert_ok!(
        h.router
            .answer("Who signed the delivery receipt?", Some(&document()))
            .await
    );

    assert_eq!(result.answer, NOT_FOUND);
    assert_eq!(result.route, Route::NotFound);
    assert_eq!(result.sources, Sources::Empty);
    assert_eq!(h.main.prompts().len(), 0);
    assert_eq!(h.fast.answer_calls(), 0);
    assert_eq!(h.index.searches(), 1);
}

#[tokio::test]
async fn empty_index_is_not_found() {
    let h = harness("DOC_STRICT", Vec::new()).await;
    let result = assert_ok!(h.router.answer("What is the invoice total?", None).await);
    assert_eq!(result.route, Route::NotFound);
    assert_eq!(h.index.searches(), 1);
}

#[tokio::test]
async fn strict_answers_are_grounded_and_cited() {
    let h = harness("DOC_STRICT", invoice_chunks()).await;

    let result = assert_ok!(
        h.router
            .answer("  What is the invoice total?  ", Some(&document()))
            .await
    );

    assert_eq!(result.route, Route::DocStrict);
    assert_eq!(result.sources, Sources::Cited("Pages: 1, 2".to_string()));
    assert!(result.note.is_none());
    assert_eq!(h.index.searches(), 1);

    let prompts = h.main.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[Source: invoice.pdf, Page: 2]"));
    assert!(prompts[0].contains("Question:\nWhat is the invoice total?"));
}

#[tokio::test]
async fn assistive_answers_carry_citations_and_note() {
    let h = harness("DOC_ASSISTIVE", invoice_chunks()).await;

    let result = assert_ok!(
        h.router
            .answer("Explain how invoice payment terms work", Some(&document()))
            .await
    );

    assert_eq!(result.route, Route::DocAssistive);
    assert_eq!(result.note.as_deref(), Some(ASSISTIVE_NOTE));
    assert!(matches!(result.sources, Sources::Cited(_)));
    assert_eq!(h.index.searches(), 1);
    assert_eq!(h.fast.answer_calls(), 1);
    assert!(h.main.prompts().is_empty());
}

#[tokio::test]
async fn chat_and_general_knowledge_skip_retrieval() {
    let chat = harness("CHAT", invoice_chunks()).await;
    let result = assert_ok!(chat.router.answer("hello!", None).await);
    assert_eq!(result.route, Route::Chat);
    assert_eq!(result.sources, Sources::Omitted);
    assert!(result.note.is_none());
    assert_eq!(chat.index.searches(), 0);
    // the raw question goes to the model
    assert_eq!(chat.fast.prompts().last().map(String::as_str), Some("hello!"));

    let general = harness("general_knowledge", invoice_chunks()).await;
    let result = assert_ok!(general.router.answer("How do rainbows form?", None).await);
    assert_eq!(result.route, Route::GeneralKnowledge);
    assert_eq!(result.note.as_deref(), Some(GENERAL_KNOWLEDGE_NOTE));
    assert_eq!(general.index.searches(), 0);
}

#[tokio::test]
async fn unknown_labels_default_to_strict() {
    let h = harness("I think this is DOC_STRICT", invoice_chunks()).await;

    let result = assert_ok!(h.router.answer("What is the invoice total?", None).await);
    assert_eq!(result.route, Route::DocStrict);
    assert_eq!(h.fast.classifier_calls(), 1);
    assert_eq!(h.index.searches(), 1);
}

#[tokio::test]
async fn generation_failures_propagate() {
    let index = CountingIndex::with_chunks(invoice_chunks()).await;
    let router = AnswerRouter::new(
        Arc::new(Unavailable),
        Arc::new(Unavailable),
        Retriever::new(index.clone(), 5),
        &AnsweringConfig::default(),
    );

    let err = assert_err!(router.answer("What is the invoice total?", None).await);
    assert!(matches!(err, AppError::GenerationError { .. }));
    assert!(err.is_upstream());
    assert_eq!(index.searches(), 0);
}

#[tokio::test]
async fn retrieval_failures_propagate_without_retry() {
    for label in ["DOC_STRICT", "DOC_ASSISTIVE"] {
        let fast = ScriptedGenerator::new(label);
        let main = ScriptedGenerator::new(label);
        let index = Arc::new(BrokenIndex::default());
        let router = AnswerRouter::new(
            fast.clone(),
            main.clone(),
            Retriever::new(index.clone(), 5),
            &AnsweringConfig::default(),
        );

        let err = assert_err!(
            router
                .answer("What is the invoice total?", Some(&document()))
                .await
        );
        assert!(matches!(err, AppError::RetrievalError { .. }));
        assert!(err.is_upstream());
        assert_eq!(index.searches.load(Ordering::SeqCst), 1);
        assert!(main.prompts().is_empty());
        assert_eq!(fast.answer_calls(), 0);
    }
}
