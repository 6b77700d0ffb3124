//! State types for the validation state machine.
//!
//! The hierarchy is an explicit tagged union: every reachable state is a
//! variant, so matching on it is exhaustive. `path()` renders the dotted
//! state path used in logs and persisted records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two answering tiers of a validation ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionTier {
    Short,
    Long,
}

impl fmt::Display for SessionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => f.write_str("short"),
            Self::Long => f.write_str("long"),
        }
    }
}

/// Progress of a submission, shared by both tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitStep {
    /// Review dialog is open (`confirm` in the short session, `review` in the long one).
    Review,
    /// Answers handed to the submitter; waiting for the result of `attempt`.
    InFlight { attempt: u32 },
    /// The attempt failed; only an explicit retry reattempts.
    Failed { attempt: u32, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortSessionState {
    Answering,
    SubmitShortSession(SubmitStep),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LongSessionState {
    WelcomeQualification,
    Flips,
    FinishFlips,
    KeywordsQualification,
    SubmitAnswers(SubmitStep),
}

/// Why a session ended without a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The long session window closed while the session was running.
    DeadlineMissed,
    /// The session was opened after both windows had already closed.
    SessionExpired,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineMissed => write!(f, "validation deadline missed"),
            Self::SessionExpired => write!(f, "validation session already expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationState {
    ShortSession(ShortSessionState),
    LongSession(LongSessionState),
    ValidationSucceeded,
    ValidationFailed(FailureReason),
}

impl ValidationState {
    /// Tier the state belongs to, `None` once the session concluded.
    #[must_use]
    pub fn tier(&self) -> Option<SessionTier> {
        match self {
            Self::ShortSession(_) => Some(SessionTier::Short),
            Self::LongSession(_) => Some(SessionTier::Long),
            Self::ValidationSucceeded | Self::ValidationFailed(_) => None,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.tier().is_none()
    }

    #[must_use]
    pub fn submit_step(&self) -> Option<&SubmitStep> {
        match self {
            Self::ShortSession(ShortSessionState::SubmitShortSession(step))
            | Self::LongSession(LongSessionState::SubmitAnswers(step)) => Some(step),
            _ => None,
        }
    }

    /// Attempt currently awaiting a result, if any.
    #[must_use]
    pub fn in_flight_attempt(&self) -> Option<u32> {
        match self.submit_step() {
            Some(SubmitStep::InFlight { attempt }) => Some(*attempt),
            _ => None,
        }
    }

    /// Same tier, different submit step.
    #[must_use]
    pub(crate) fn with_submit_step(&self, step: SubmitStep) -> Option<Self> {
        match self.tier()? {
            SessionTier::Short => Some(Self::ShortSession(
                ShortSessionState::SubmitShortSession(step),
            )),
            SessionTier::Long => Some(Self::LongSession(LongSessionState::SubmitAnswers(step))),
        }
    }

    /// Dotted state path, e.g. `shortSession.solve.answer.submitShortSession.fail`.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::ShortSession(ShortSessionState::Answering) => {
                "shortSession.solve.answer".to_string()
            }
            Self::ShortSession(ShortSessionState::SubmitShortSession(step)) => format!(
                "shortSession.solve.answer.submitShortSession.{}",
                step_name(step, "confirm")
            ),
            Self::LongSession(LongSessionState::WelcomeQualification) => {
                "longSession.solve.answer.welcomeQualification".to_string()
            }
            Self::LongSession(LongSessionState::Flips) => "longSession.solve.answer.flips".to_string(),
            Self::LongSession(LongSessionState::FinishFlips) => {
                "longSession.solve.answer.finishFlips".to_string()
            }
            Self::LongSession(LongSessionState::KeywordsQualification) => {
                "longSession.solve.answer.keywordsQualification".to_string()
            }
            Self::LongSession(LongSessionState::SubmitAnswers(step)) => format!(
                "longSession.solve.answer.submitAnswers.{}",
                step_name(step, "review")
            ),
            Self::ValidationSucceeded => "validationSucceeded".to_string(),
            Self::ValidationFailed(_) => "validationFailed".to_string(),
        }
    }
}

fn step_name<'a>(step: &SubmitStep, review: &'a str) -> &'a str {
    match step {
        SubmitStep::Review => review,
        SubmitStep::InFlight { .. } => "submitHash",
        SubmitStep::Failed { .. } => "fail",
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_state_hierarchy() {
        let state = ValidationState::ShortSession(ShortSessionState::SubmitShortSession(
            SubmitStep::Failed {
                attempt: 1,
                error: "boom".into(),
            },
        ));
        assert_eq!(state.path(), "shortSession.solve.answer.submitShortSession.fail");

        let state = ValidationState::LongSession(LongSessionState::SubmitAnswers(SubmitStep::Review));
        assert_eq!(state.path(), "longSession.solve.answer.submitAnswers.review");

        let state = ValidationState::ShortSession(ShortSessionState::SubmitShortSession(
            SubmitStep::Review,
        ));
        assert_eq!(state.to_string(), "shortSession.solve.answer.submitShortSession.confirm");
    }

    #[test]
    fn terminal_states_have_no_tier() {
        assert!(ValidationState::ValidationSucceeded.is_terminal());
        assert!(ValidationState::ValidationFailed(FailureReason::DeadlineMissed).is_terminal());
        assert_eq!(
            ValidationState::LongSession(LongSessionState::Flips).tier(),
            Some(SessionTier::Long)
        );
    }

    #[test]
    fn in_flight_attempt_is_exposed() {
        let state = ValidationState::LongSession(LongSessionState::SubmitAnswers(
            SubmitStep::InFlight { attempt: 3 },
        ));
        assert_eq!(state.in_flight_attempt(), Some(3));
        assert_eq!(
            ValidationState::ShortSession(ShortSessionState::Answering).in_flight_attempt(),
            None
        );
    }
}
