use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::SessionContext;
use super::effect::Effect;
use super::event::Event;
use super::state::{
    FailureReason, LongSessionState, ShortSessionState, SubmitStep, ValidationState,
};
use super::transition::transition;
use crate::deadline::{DeadlineClock, SessionPhase};
use crate::error::RestoreError;
use crate::model::{Flip, SessionParams};

/// Error recorded on an attempt that was in flight when the session was reloaded.
pub const INTERRUPTED_SUBMISSION: &str = "submission interrupted by reload";

/// State path plus context: everything needed to render or resume a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    state: ValidationState,
    context: SessionContext,
}

impl ValidationSnapshot {
    #[must_use]
    pub fn new(state: ValidationState, context: SessionContext) -> Self {
        Self { state, context }
    }

    #[must_use]
    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub(crate) fn state_mut(&mut self) -> &mut ValidationState {
        &mut self.state
    }

    pub(crate) fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.context
    }
}

/// Owner of one session's snapshot; the only way to mutate it is `send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMachine {
    snapshot: ValidationSnapshot,
}

impl ValidationMachine {
    /// Create a fresh session, entering whichever phase is open at `now`.
    #[must_use]
    pub fn start(
        params: SessionParams,
        short_flips: Vec<Flip>,
        long_flips: Vec<Flip>,
        now: DateTime<Utc>,
    ) -> Self {
        let state = match DeadlineClock::new(params.timing()).phase_at(now) {
            SessionPhase::ShortSession => ValidationState::ShortSession(ShortSessionState::Answering),
            SessionPhase::LongSession => {
                ValidationState::LongSession(LongSessionState::WelcomeQualification)
            }
            SessionPhase::Closed => ValidationState::ValidationFailed(FailureReason::SessionExpired),
        };
        let context = SessionContext::new(params, short_flips, long_flips);
        Self {
            snapshot: ValidationSnapshot::new(state, context),
        }
    }

    /// Resume a persisted snapshot with the live session parameters.
    ///
    /// The credential is never persisted, so `params` replaces the stored ones.
    /// An attempt that was in flight at persist time resumes as failed: its
    /// outcome is unknown and only an explicit retry may submit again.
    ///
    /// # Errors
    ///
    /// Returns `RestoreError::EpochMismatch` if the snapshot belongs to another epoch.
    pub fn restore(
        params: SessionParams,
        snapshot: ValidationSnapshot,
    ) -> Result<Self, RestoreError> {
        let found = snapshot.context.params().epoch();
        if found != params.epoch() {
            return Err(RestoreError::EpochMismatch {
                expected: params.epoch(),
                found,
            });
        }

        let mut snapshot = snapshot;
        snapshot.context.set_params(params);
        if let Some(attempt) = snapshot.state.in_flight_attempt() {
            let failed = SubmitStep::Failed {
                attempt,
                error: INTERRUPTED_SUBMISSION.to_string(),
            };
            if let Some(state) = snapshot.state.with_submit_step(failed) {
                snapshot.state = state;
            }
        }

        Ok(Self { snapshot })
    }

    /// Process one event to completion and return the effects to run.
    pub fn send(&mut self, event: Event) -> Vec<Effect> {
        let result = transition(self.snapshot.clone(), event);
        self.snapshot = result.snapshot;
        result.effects
    }

    #[must_use]
    pub fn snapshot(&self) -> &ValidationSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn state(&self) -> &ValidationState {
        &self.snapshot.state
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.snapshot.context
    }
}
