//! Intent classification
//!
//! One fast-model call per question. The classifier reports the raw label;
//! mapping unknown labels to a default is the router's decision.

use super::prompts;
use crate::errors::Result;
use crate::llm::Generator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// How a question should be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Small talk, answered directly
    Chat,
    /// Explicitly not about the document
    GeneralKnowledge,
    /// Answer only from retrieved document context
    DocStrict,
    /// General explanation of something the document mentions
    DocAssistive,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Chat,
        Intent::GeneralKnowledge,
        Intent::DocStrict,
        Intent::DocAssistive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Chat => "CHAT",
            Intent::GeneralKnowledge => "GENERAL_KNOWLEDGE",
            Intent::DocStrict => "DOC_STRICT",
            Intent::DocAssistive => "DOC_ASSISTIVE",
        }
    }

    /// Whether answering needs the vector index
    pub fn needs_retrieval(&self) -> bool {
        matches!(self, Intent::DocStrict | Intent::DocAssistive)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label outside the fixed intent set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized intent label: {0:?}")]
pub struct UnknownIntent(pub String);

impl FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| UnknownIntent(s.to_string()))
    }
}

/// Asks the language model for an intent label
#[derive(Clone)]
pub struct IntentClassifier {
    generator: Arc<dyn Generator>,
}

impl IntentClassifier {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Raw label, upper-cased and trimmed; may be outside the known set
    pub async fn classify(&self, question: &str) -> Result<String> {
        let response = self
            .generator
            .generate(&prompts::intent_prompt(question))
            .await?;
        let label = response.trim().to_uppercase();

        debug!(label = %label, model = self.generator.model_name(), "Intent label received");
        Ok(label)
    }
}
