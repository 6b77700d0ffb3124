//! Events fed into the validation state machine.
//!
//! UI actions, deadline ticks, submission results and flip loader updates all
//! share this one type so they can be serialized through a single queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{AnswerOption, FlipHash, FlipStatus, Relevance};

/// Opaque keyword translations, keyed by keyword id.
pub type Translations = BTreeMap<u32, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    // =========================================================================
    // UI events
    // =========================================================================
    Answer {
        hash: FlipHash,
        option: AnswerOption,
    },
    ToggleWords {
        hash: FlipHash,
        relevance: Relevance,
    },
    Pick {
        index: usize,
    },
    Prev,
    Next,
    Submit,
    RetrySubmit,
    /// Jump to `index`, or to the first unanswered flip when `index` is out of
    /// range. Callers pass `-1` when they found no unanswered flip themselves.
    CheckFlips {
        index: i64,
    },
    CheckReports,
    Cancel,
    RefetchFlips,
    StartLongSession,
    StartKeywordsQualification,
    FinishFlips,

    // =========================================================================
    // Deadline clock
    // =========================================================================
    Tick {
        now: DateTime<Utc>,
    },

    // =========================================================================
    // Submission results
    // =========================================================================
    SubmitSucceeded {
        attempt: u32,
    },
    SubmitFailed {
        attempt: u32,
        error: String,
    },

    // =========================================================================
    // Flip loader
    // =========================================================================
    FlipStatus {
        hash: FlipHash,
        status: FlipStatus,
    },
    KeywordsLoaded {
        hash: FlipHash,
        words: Vec<u32>,
    },
    TranslationsLoaded {
        translations: Translations,
    },
}

impl Event {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Answer { .. } => "ANSWER",
            Self::ToggleWords { .. } => "TOGGLE_WORDS",
            Self::Pick { .. } => "PICK",
            Self::Prev => "PREV",
            Self::Next => "NEXT",
            Self::Submit => "SUBMIT",
            Self::RetrySubmit => "RETRY_SUBMIT",
            Self::CheckFlips { .. } => "CHECK_FLIPS",
            Self::CheckReports => "CHECK_REPORTS",
            Self::Cancel => "CANCEL",
            Self::RefetchFlips => "REFETCH_FLIPS",
            Self::StartLongSession => "START_LONG_SESSION",
            Self::StartKeywordsQualification => "START_KEYWORDS_QUALIFICATION",
            Self::FinishFlips => "FINISH_FLIPS",
            Self::Tick { .. } => "TICK",
            Self::SubmitSucceeded { .. } => "SUBMIT_SUCCEEDED",
            Self::SubmitFailed { .. } => "SUBMIT_FAILED",
            Self::FlipStatus { .. } => "FLIP_STATUS",
            Self::KeywordsLoaded { .. } => "KEYWORDS_LOADED",
            Self::TranslationsLoaded { .. } => "TRANSLATIONS_LOADED",
        }
    }
}
