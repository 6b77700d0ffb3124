//! Query predicates consumed by the UI.
//!
//! All of these are pure projections of a snapshot and are never persisted.

use super::snapshot::ValidationSnapshot;
use super::state::{LongSessionState, SessionTier, SubmitStep, ValidationState};
use crate::model::Flip;
use crate::quota::available_reports_number;
use crate::sequence::{first_unanswered_index, solvable_flips};

#[must_use]
pub fn is_short_session(snapshot: &ValidationSnapshot) -> bool {
    matches!(snapshot.state(), ValidationState::ShortSession(_))
}

#[must_use]
pub fn is_long_session(snapshot: &ValidationSnapshot) -> bool {
    matches!(snapshot.state(), ValidationState::LongSession(_))
}

/// Answering long-session flips (before keyword qualification).
#[must_use]
pub fn is_long_session_flips(snapshot: &ValidationSnapshot) -> bool {
    matches!(
        snapshot.state(),
        ValidationState::LongSession(LongSessionState::Flips | LongSessionState::FinishFlips)
    )
}

#[must_use]
pub fn is_long_session_keywords(snapshot: &ValidationSnapshot) -> bool {
    matches!(
        snapshot.state(),
        ValidationState::LongSession(
            LongSessionState::KeywordsQualification | LongSessionState::SubmitAnswers(_)
        )
    )
}

#[must_use]
pub fn is_solving(snapshot: &ValidationSnapshot) -> bool {
    snapshot.state().tier().is_some()
}

#[must_use]
pub fn is_submitting(snapshot: &ValidationSnapshot) -> bool {
    matches!(snapshot.state().submit_step(), Some(SubmitStep::InFlight { .. }))
}

#[must_use]
pub fn is_submit_failed(snapshot: &ValidationSnapshot) -> bool {
    matches!(snapshot.state().submit_step(), Some(SubmitStep::Failed { .. }))
}

#[must_use]
pub fn is_validation_succeeded(snapshot: &ValidationSnapshot) -> bool {
    matches!(snapshot.state(), ValidationState::ValidationSucceeded)
}

#[must_use]
pub fn is_validation_failed(snapshot: &ValidationSnapshot) -> bool {
    matches!(snapshot.state(), ValidationState::ValidationFailed(_))
}

/// Tier whose flips are on screen. Concluded sessions keep showing long flips.
#[must_use]
pub fn display_tier(snapshot: &ValidationSnapshot) -> SessionTier {
    snapshot.state().tier().unwrap_or(SessionTier::Long)
}

/// Active, ordered flip sequence for the current tier.
#[must_use]
pub fn session_flips(snapshot: &ValidationSnapshot) -> Vec<&Flip> {
    snapshot.context().sequence(display_tier(snapshot))
}

#[must_use]
pub fn current_flip(snapshot: &ValidationSnapshot) -> Option<&Flip> {
    session_flips(snapshot)
        .get(snapshot.context().current_index())
        .copied()
}

/// Decoded flips of the active sequence, as listed in review dialogs.
#[must_use]
pub fn review_flips(snapshot: &ValidationSnapshot) -> Vec<&Flip> {
    solvable_flips(&session_flips(snapshot))
}

#[must_use]
pub fn first_unanswered(snapshot: &ValidationSnapshot) -> Option<usize> {
    first_unanswered_index(&session_flips(snapshot))
}

#[must_use]
pub fn is_first_flip(snapshot: &ValidationSnapshot) -> bool {
    is_solving(snapshot) && snapshot.context().current_index() == 0
}

#[must_use]
pub fn is_last_flip(snapshot: &ValidationSnapshot) -> bool {
    let len = session_flips(snapshot).len();
    is_solving(snapshot) && len > 0 && snapshot.context().current_index() == len - 1
}

#[must_use]
pub fn has_many_flips(snapshot: &ValidationSnapshot) -> bool {
    session_flips(snapshot).len() > 1
}

/// Every required flip of the current tier is decoded and answered.
///
/// Short session: decoded, non-extra short flips. Long session: decoded long
/// flips. An empty requirement set never counts as complete.
#[must_use]
pub fn has_all_answers(snapshot: &ValidationSnapshot) -> bool {
    let context = snapshot.context();
    let required: Vec<&Flip> = if is_short_session(snapshot) {
        context
            .short_flips()
            .iter()
            .filter(|flip| flip.is_decoded() && !flip.is_extra())
            .collect()
    } else {
        context
            .long_flips()
            .iter()
            .filter(|flip| flip.is_decoded())
            .collect()
    };
    !required.is_empty() && required.iter().all(|flip| flip.is_answered())
}

/// Every keyword flip of the long session carries a relevance mark.
#[must_use]
pub fn has_all_relevance_marks(snapshot: &ValidationSnapshot) -> bool {
    snapshot
        .context()
        .long_flips()
        .iter()
        .filter(|flip| flip.is_keyword_flip())
        .all(|flip| flip.relevance().is_some())
}

#[must_use]
pub fn can_submit(snapshot: &ValidationSnapshot) -> bool {
    if is_submitting(snapshot) {
        return false;
    }
    if is_short_session(snapshot) || is_long_session_flips(snapshot) {
        return has_all_answers(snapshot) || is_last_flip(snapshot);
    }
    if is_long_session_keywords(snapshot) {
        return has_all_relevance_marks(snapshot) || is_last_flip(snapshot);
    }
    false
}

#[must_use]
pub fn available_reports(snapshot: &ValidationSnapshot) -> usize {
    available_reports_number(snapshot.context().long_flips())
}

/// Reports still allowed before the quota is reached.
#[must_use]
pub fn reports_left(snapshot: &ValidationSnapshot) -> usize {
    available_reports(snapshot).saturating_sub(snapshot.context().reported_flips_count())
}
