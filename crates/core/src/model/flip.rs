use serde::{Deserialize, Serialize};

use crate::model::ids::FlipHash;

//
// ─── ANSWER OPTION ────────────────────────────────────────────────────────────
//

/// Side of the flip the user picked as the meaningful story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerOption {
    Left,
    Right,
}

//
// ─── RELEVANCE ────────────────────────────────────────────────────────────────
//

/// Qualification mark applied during keyword qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relevance {
    /// Both keywords are relevant to the story.
    Relevant,
    /// The flip is reported.
    Irrelevant,
}

//
// ─── LOAD STATUS ──────────────────────────────────────────────────────────────
//

/// Load/decode status reported by the flip fetcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FlipStatus {
    pub fetched: bool,
    pub decoded: bool,
    pub failed: bool,
    pub missing: bool,
}

impl FlipStatus {
    /// Status of a flip whose images were fetched and decoded.
    #[must_use]
    pub fn decoded() -> Self {
        Self {
            fetched: true,
            decoded: true,
            failed: false,
            missing: false,
        }
    }

    /// Status of a flip that could not be loaded at all.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            fetched: true,
            decoded: false,
            failed: true,
            missing: true,
        }
    }
}

//
// ─── FLIP ─────────────────────────────────────────────────────────────────────
//

/// One challenge item of a validation session.
///
/// The hash never changes after creation. `option` and `relevance` are only
/// written by explicit answer/mark events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    hash: FlipHash,
    #[serde(default)]
    status: FlipStatus,
    #[serde(default)]
    extra: bool,
    #[serde(default)]
    words: Vec<u32>,
    #[serde(default)]
    option: Option<AnswerOption>,
    #[serde(default)]
    relevance: Option<Relevance>,
}

impl Flip {
    #[must_use]
    pub fn new(hash: impl Into<FlipHash>) -> Self {
        Self {
            hash: hash.into(),
            status: FlipStatus::default(),
            extra: false,
            words: Vec::new(),
            option: None,
            relevance: None,
        }
    }

    /// Marks the flip as a spare item that is not required to be answered.
    #[must_use]
    pub fn with_extra(mut self, extra: bool) -> Self {
        self.extra = extra;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: FlipStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_words(mut self, words: Vec<u32>) -> Self {
        self.words = words;
        self
    }

    #[must_use]
    pub fn hash(&self) -> &FlipHash {
        &self.hash
    }

    #[must_use]
    pub fn status(&self) -> FlipStatus {
        self.status
    }

    #[must_use]
    pub fn is_decoded(&self) -> bool {
        self.status.decoded
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status.failed
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.status.missing
    }

    #[must_use]
    pub fn is_extra(&self) -> bool {
        self.extra
    }

    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    #[must_use]
    pub fn option(&self) -> Option<AnswerOption> {
        self.option
    }

    #[must_use]
    pub fn relevance(&self) -> Option<Relevance> {
        self.relevance
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.option.is_some()
    }

    /// Decoded flips carrying at least one keyword take part in qualification.
    #[must_use]
    pub fn is_keyword_flip(&self) -> bool {
        self.status.decoded && !self.words.is_empty()
    }

    pub(crate) fn set_option(&mut self, option: AnswerOption) {
        self.option = Some(option);
    }

    pub(crate) fn set_relevance(&mut self, relevance: Relevance) {
        self.relevance = Some(relevance);
    }

    pub(crate) fn set_status(&mut self, status: FlipStatus) {
        self.status = status;
    }

    pub(crate) fn set_words(&mut self, words: Vec<u32>) {
        self.words = words;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_flip_requires_decoded_and_words() {
        let flip = Flip::new("a").with_words(vec![1, 2]);
        assert!(!flip.is_keyword_flip());

        let flip = flip.with_status(FlipStatus::decoded());
        assert!(flip.is_keyword_flip());

        let flip = Flip::new("b").with_status(FlipStatus::decoded());
        assert!(!flip.is_keyword_flip());
    }

    #[test]
    fn persisted_flip_tolerates_missing_fields() {
        let flip: Flip = serde_json::from_str(r#"{"hash":"h1"}"#).unwrap();
        assert_eq!(flip.hash().as_str(), "h1");
        assert_eq!(flip.option(), None);
        assert!(!flip.is_extra());
    }
}
