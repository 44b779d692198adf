//! Layout classification
//!
//! Two text-only strategies exist and intentionally disagree:
//! - [`CaseLengthClassifier`] runs on the document model: all-caps and
//!   shorter than 100 chars is a heading, shorter than 50 is short text,
//!   anything else a paragraph.
//! - [`DigitSignalClassifier`] runs at extraction time: all-caps and longer
//!   than 6 chars is a heading, any digit marks a key/value line.
//!
//! Callers pick one explicitly via [`ClassifierStrategy`].

use super::{BlockType, ClassifiedBlock, NormalizedBlock};
use serde::{Deserialize, Serialize};

/// Which classification heuristic to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    CaseLength,
    DigitSignal,
}

/// Assigns a layout role to a block of text
pub trait BlockClassifier: Send + Sync {
    fn strategy(&self) -> ClassifierStrategy;

    /// Classify already-trimmed, non-empty text
    fn classify(&self, text: &str) -> BlockType;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CaseLengthClassifier;

impl BlockClassifier for CaseLengthClassifier {
    fn strategy(&self) -> ClassifierStrategy {
        ClassifierStrategy::CaseLength
    }

    fn classify(&self, text: &str) -> BlockType {
        let len = text.chars().count();
        if is_upper(text) && len < 100 {
            BlockType::Heading
        } else if len < 50 {
            BlockType::ShortText
        } else {
            BlockType::Paragraph
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DigitSignalClassifier;

impl BlockClassifier for DigitSignalClassifier {
    fn strategy(&self) -> ClassifierStrategy {
        ClassifierStrategy::DigitSignal
    }

    fn classify(&self, text: &str) -> BlockType {
        if is_upper(text) && text.chars().count() > 6 {
            BlockType::Heading
        } else if text.chars().any(|c| c.is_ascii_digit()) {
            BlockType::KeyValue
        } else {
            BlockType::Paragraph
        }
    }
}

pub fn classifier_for(strategy: ClassifierStrategy) -> Box<dyn BlockClassifier> {
    match strategy {
        ClassifierStrategy::CaseLength => Box::new(CaseLengthClassifier),
        ClassifierStrategy::DigitSignal => Box::new(DigitSignalClassifier),
    }
}

/// Classify block texts in order; blank texts are skipped
pub fn classify_blocks<S: AsRef<str>>(
    texts: &[S],
    classifier: &dyn BlockClassifier,
) -> Vec<ClassifiedBlock> {
    texts
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(|text| ClassifiedBlock {
            text: text.to_string(),
            block_type: classifier.classify(text),
        })
        .collect()
}

/// Overwrite the layout role of normalized blocks in place
pub fn tag_blocks(blocks: &mut [NormalizedBlock], classifier: &dyn BlockClassifier) {
    for block in blocks.iter_mut() {
        block.block_type = classifier.classify(&block.text);
    }
}

/// At least one cased character and no lowercase ones
fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_length_examples() {
        let c = CaseLengthClassifier;
        assert_eq!(c.classify("INTRODUCTION"), BlockType::Heading);
        assert_eq!(c.classify("Figure 3"), BlockType::ShortText);

        let sentence: String = "Revenue grew steadily across every region this year. "
            .repeat(3)
            .chars()
            .take(120)
            .collect();
        assert_eq!(sentence.chars().count(), 120);
        assert_eq!(c.classify(&sentence), BlockType::Paragraph);
    }

    #[test]
    fn test_long_upper_text_is_not_heading() {
        let shouting = "A".repeat(120);
        assert_eq!(CaseLengthClassifier.classify(&shouting), BlockType::Paragraph);
    }

    #[test]
    fn test_digits_alone_are_not_upper() {
        // "2024" has no cased characters
        assert_eq!(CaseLengthClassifier.classify("2024"), BlockType::ShortText);
        assert_eq!(DigitSignalClassifier.classify("2024"), BlockType::KeyValue);
    }

    #[test]
    fn test_digit_signal_examples() {
        let c = DigitSignalClassifier;
        assert_eq!(c.classify("SUMMARY OF FINDINGS"), BlockType::Heading);
        assert_eq!(c.classify("TOTAL"), BlockType::Paragraph);
        assert_eq!(c.classify("Invoice no: 4471"), BlockType::KeyValue);
        assert_eq!(c.classify("plain words only"), BlockType::Paragraph);
    }

    #[test]
    fn test_strategies_disagree() {
        let text = "Figure 3";
        let a = classifier_for(ClassifierStrategy::CaseLength);
        let b = classifier_for(ClassifierStrategy::DigitSignal);
        assert_eq!(a.strategy(), ClassifierStrategy::CaseLength);
        assert_eq!(b.strategy(), ClassifierStrategy::DigitSignal);
        assert_ne!(a.classify(text), b.classify(text));
    }

    #[test]
    fn test_classify_blocks_skips_blank() {
        let classified = classify_blocks(&["  METHODS ", "", "   ", "short one"], &CaseLengthClassifier);
        assert_eq!(classified.len(), 2);
        assert_eq!(classified[0].text, "METHODS");
        assert_eq!(classified[0].block_type, BlockType::Heading);
        assert_eq!(classified[1].block_type, BlockType::ShortText);
    }
}
