//! Effects (side effects as data).
//!
//! Transitions never perform I/O; they describe what the runtime should do.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::state::{FailureReason, SessionTier};
use crate::model::{AnswerOption, FlipHash, Relevance};

/// How long the "too many reports" notice stays visible.
pub const EXCEEDED_REPORTS_NOTICE: Duration = Duration::from_secs(3);

/// One flip's entry in a submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipAnswer {
    pub hash: FlipHash,
    pub option: Option<AnswerOption>,
    pub relevance: Option<Relevance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Hand the answers of `tier` to the submitter and report back with `attempt`.
    SubmitAnswers {
        tier: SessionTier,
        attempt: u32,
        answers: Vec<FlipAnswer>,
    },

    /// Ask the loader to fetch these flips again.
    RefetchFlips { hashes: Vec<FlipHash> },

    /// A report mark was rejected because the quota is used up.
    ExceededReports { dismiss_after: Duration },

    ValidationSucceeded,

    ValidationFailed { reason: FailureReason },
}

impl Effect {
    #[must_use]
    pub fn exceeded_reports() -> Self {
        Self::ExceededReports {
            dismiss_after: EXCEEDED_REPORTS_NOTICE,
        }
    }
}
