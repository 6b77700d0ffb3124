//! Pure state transition function.
//!
//! `transition` takes the current snapshot and one event and returns the next
//! snapshot plus the effects to execute. Unknown events and failed guards
//! leave the snapshot untouched. Concluded sessions ignore every event.

use chrono::{DateTime, Utc};

use super::effect::Effect;
use super::event::Event;
use super::predicates::can_submit;
use super::snapshot::ValidationSnapshot;
use super::state::{
    FailureReason, LongSessionState, SessionTier, ShortSessionState, SubmitStep, ValidationState,
};
use crate::deadline::{DeadlineClock, SessionPhase};
use crate::model::{AnswerOption, FlipHash, Relevance};
use crate::quota::available_reports_number;
use crate::sequence::{first_unanswered_index, first_unmarked_index};

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub snapshot: ValidationSnapshot,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(snapshot: ValidationSnapshot, effects: Vec<Effect>) -> Self {
        Self { snapshot, effects }
    }

    #[must_use]
    pub fn no_change(snapshot: ValidationSnapshot) -> Self {
        Self {
            snapshot,
            effects: vec![],
        }
    }
}

/// Pure state transition function.
#[must_use]
pub fn transition(snapshot: ValidationSnapshot, event: Event) -> TransitionResult {
    let Some(tier) = snapshot.state().tier() else {
        return TransitionResult::no_change(snapshot);
    };
    let mut snapshot = snapshot;

    match event {
        Event::Tick { now } => on_tick(snapshot, tier, now),
        Event::SubmitSucceeded { attempt } => on_submit_succeeded(snapshot, attempt),
        Event::SubmitFailed { attempt, error } => on_submit_failed(snapshot, attempt, error),

        // Answers and navigation are accepted in every solving state.
        Event::Answer { hash, option } => {
            answer(&mut snapshot, tier, &hash, option);
            TransitionResult::no_change(snapshot)
        }
        Event::Prev => {
            navigate(&mut snapshot, tier, |current, _| Some(current.saturating_sub(1)));
            TransitionResult::no_change(snapshot)
        }
        Event::Next => {
            navigate(&mut snapshot, tier, |current, len| Some((current + 1).min(len - 1)));
            TransitionResult::no_change(snapshot)
        }
        Event::Pick { index } => {
            navigate(&mut snapshot, tier, |_, len| (index < len).then_some(index));
            TransitionResult::no_change(snapshot)
        }
        Event::RefetchFlips => refetch(snapshot, tier),

        // Loader updates.
        Event::FlipStatus { hash, status } => {
            if let Some(flip) = snapshot.context_mut().flip_mut(&hash) {
                flip.set_status(status);
            }
            snapshot.context_mut().clamp_current_index(tier);
            TransitionResult::no_change(snapshot)
        }
        Event::KeywordsLoaded { hash, words } => {
            if let Some(flip) = snapshot.context_mut().flip_mut(&hash) {
                flip.set_words(words);
            }
            TransitionResult::no_change(snapshot)
        }
        Event::TranslationsLoaded { translations } => {
            snapshot.context_mut().set_translations(translations);
            TransitionResult::no_change(snapshot)
        }

        event => match tier {
            SessionTier::Short => short_session(snapshot, event),
            SessionTier::Long => long_session(snapshot, event),
        },
    }
}

// =============================================================================
// Short session
// =============================================================================

fn short_session(snapshot: ValidationSnapshot, event: Event) -> TransitionResult {
    let ValidationState::ShortSession(state) = snapshot.state().clone() else {
        return TransitionResult::no_change(snapshot);
    };

    match (state, event) {
        (ShortSessionState::Answering, Event::Submit) if can_submit(&snapshot) => enter(
            snapshot,
            ValidationState::ShortSession(ShortSessionState::SubmitShortSession(
                SubmitStep::Review,
            )),
        ),
        (ShortSessionState::SubmitShortSession(SubmitStep::Review), Event::Submit)
        | (
            ShortSessionState::SubmitShortSession(SubmitStep::Failed { .. }),
            Event::RetrySubmit,
        ) => begin_submission(snapshot, SessionTier::Short),
        (ShortSessionState::SubmitShortSession(SubmitStep::Review), Event::Cancel) => enter(
            snapshot,
            ValidationState::ShortSession(ShortSessionState::Answering),
        ),
        _ => TransitionResult::no_change(snapshot),
    }
}

// =============================================================================
// Long session
// =============================================================================

fn long_session(snapshot: ValidationSnapshot, event: Event) -> TransitionResult {
    let ValidationState::LongSession(state) = snapshot.state().clone() else {
        return TransitionResult::no_change(snapshot);
    };
    let keywords = ValidationState::LongSession(LongSessionState::KeywordsQualification);

    match (state, event) {
        (LongSessionState::WelcomeQualification, Event::StartLongSession) => enter(
            snapshot,
            ValidationState::LongSession(LongSessionState::Flips),
        ),
        (LongSessionState::Flips, Event::FinishFlips) if can_submit(&snapshot) => enter(
            snapshot,
            ValidationState::LongSession(LongSessionState::FinishFlips),
        ),
        // Dismissing the intro dialog proceeds as well.
        (LongSessionState::FinishFlips, Event::StartKeywordsQualification | Event::Cancel) => {
            let mut snapshot = snapshot;
            snapshot.context_mut().set_current_index(0);
            enter(snapshot, keywords)
        }

        (
            LongSessionState::KeywordsQualification | LongSessionState::SubmitAnswers(_),
            Event::ToggleWords { hash, relevance },
        ) => toggle_words(snapshot, &hash, relevance),

        (LongSessionState::KeywordsQualification, Event::Submit) if can_submit(&snapshot) => enter(
            snapshot,
            ValidationState::LongSession(LongSessionState::SubmitAnswers(SubmitStep::Review)),
        ),
        (LongSessionState::KeywordsQualification, Event::CheckFlips { index }) => {
            let mut snapshot = snapshot;
            check_flips(&mut snapshot, index);
            TransitionResult::no_change(snapshot)
        }
        (LongSessionState::KeywordsQualification, Event::CheckReports) => {
            let mut snapshot = snapshot;
            check_reports(&mut snapshot);
            TransitionResult::no_change(snapshot)
        }

        // From the review dialog the checks close the dialog first.
        (LongSessionState::SubmitAnswers(SubmitStep::Review), Event::CheckFlips { index }) => {
            let mut snapshot = snapshot;
            check_flips(&mut snapshot, index);
            enter(snapshot, keywords)
        }
        (LongSessionState::SubmitAnswers(SubmitStep::Review), Event::CheckReports) => {
            let mut snapshot = snapshot;
            check_reports(&mut snapshot);
            enter(snapshot, keywords)
        }
        (LongSessionState::SubmitAnswers(SubmitStep::Review), Event::Cancel) => {
            enter(snapshot, keywords)
        }
        (LongSessionState::SubmitAnswers(SubmitStep::Review), Event::Submit)
        | (LongSessionState::SubmitAnswers(SubmitStep::Failed { .. }), Event::RetrySubmit) => {
            begin_submission(snapshot, SessionTier::Long)
        }
        _ => TransitionResult::no_change(snapshot),
    }
}

// =============================================================================
// Deadline and submission results
// =============================================================================

fn on_tick(snapshot: ValidationSnapshot, tier: SessionTier, now: DateTime<Utc>) -> TransitionResult {
    // An in-flight attempt is resolved before any deadline applies.
    if snapshot.state().in_flight_attempt().is_some() {
        return TransitionResult::no_change(snapshot);
    }

    let phase = DeadlineClock::new(snapshot.context().params().timing()).phase_at(now);
    match (tier, phase) {
        (_, SessionPhase::Closed) => {
            let reason = FailureReason::DeadlineMissed;
            let mut snapshot = snapshot;
            *snapshot.state_mut() = ValidationState::ValidationFailed(reason);
            TransitionResult::new(snapshot, vec![Effect::ValidationFailed { reason }])
        }
        (SessionTier::Short, SessionPhase::LongSession) => {
            let mut snapshot = snapshot;
            snapshot.context_mut().set_current_index(0);
            enter(
                snapshot,
                ValidationState::LongSession(LongSessionState::WelcomeQualification),
            )
        }
        _ => TransitionResult::no_change(snapshot),
    }
}

fn on_submit_succeeded(snapshot: ValidationSnapshot, attempt: u32) -> TransitionResult {
    if snapshot.state().in_flight_attempt() != Some(attempt) {
        return TransitionResult::no_change(snapshot);
    }
    let mut snapshot = snapshot;
    *snapshot.state_mut() = ValidationState::ValidationSucceeded;
    TransitionResult::new(snapshot, vec![Effect::ValidationSucceeded])
}

fn on_submit_failed(snapshot: ValidationSnapshot, attempt: u32, error: String) -> TransitionResult {
    if snapshot.state().in_flight_attempt() != Some(attempt) {
        return TransitionResult::no_change(snapshot);
    }
    match snapshot
        .state()
        .with_submit_step(SubmitStep::Failed { attempt, error })
    {
        Some(state) => enter(snapshot, state),
        None => TransitionResult::no_change(snapshot),
    }
}

fn begin_submission(snapshot: ValidationSnapshot, tier: SessionTier) -> TransitionResult {
    let mut snapshot = snapshot;
    let attempt = snapshot.context_mut().next_attempt();
    let answers = snapshot.context().submission_answers(tier);
    let Some(state) = snapshot
        .state()
        .with_submit_step(SubmitStep::InFlight { attempt })
    else {
        return TransitionResult::no_change(snapshot);
    };
    *snapshot.state_mut() = state;
    TransitionResult::new(
        snapshot,
        vec![Effect::SubmitAnswers {
            tier,
            attempt,
            answers,
        }],
    )
}

// =============================================================================
// Context updates
// =============================================================================

fn enter(snapshot: ValidationSnapshot, state: ValidationState) -> TransitionResult {
    let mut snapshot = snapshot;
    *snapshot.state_mut() = state;
    TransitionResult::no_change(snapshot)
}

fn answer(snapshot: &mut ValidationSnapshot, tier: SessionTier, hash: &FlipHash, option: AnswerOption) {
    let in_sequence = snapshot
        .context()
        .sequence(tier)
        .iter()
        .any(|flip| flip.hash() == hash);
    if !in_sequence {
        return;
    }
    if let Some(flip) = snapshot
        .context_mut()
        .tier_flips_mut(tier)
        .iter_mut()
        .find(|flip| flip.hash() == hash)
    {
        flip.set_option(option);
    }
}

/// Moves `current_index` to `target(current, len)` when the sequence is non-empty.
fn navigate(
    snapshot: &mut ValidationSnapshot,
    tier: SessionTier,
    target: impl FnOnce(usize, usize) -> Option<usize>,
) {
    let len = snapshot.context().sequence(tier).len();
    if len == 0 {
        return;
    }
    if let Some(index) = target(snapshot.context().current_index(), len) {
        snapshot.context_mut().set_current_index(index);
    }
}

fn refetch(snapshot: ValidationSnapshot, tier: SessionTier) -> TransitionResult {
    let hashes: Vec<FlipHash> = snapshot
        .context()
        .sequence(tier)
        .iter()
        .filter(|flip| !flip.is_decoded())
        .map(|flip| flip.hash().clone())
        .collect();
    if hashes.is_empty() {
        return TransitionResult::no_change(snapshot);
    }
    TransitionResult::new(snapshot, vec![Effect::RefetchFlips { hashes }])
}

fn toggle_words(snapshot: ValidationSnapshot, hash: &FlipHash, relevance: Relevance) -> TransitionResult {
    let context = snapshot.context();
    let Some(current) = context
        .long_flips()
        .iter()
        .find(|flip| flip.hash() == hash)
        .map(|flip| flip.relevance())
    else {
        return TransitionResult::no_change(snapshot);
    };

    let adds_report = relevance == Relevance::Irrelevant && current != Some(Relevance::Irrelevant);
    if adds_report && context.reported_flips_count() >= available_reports_number(context.long_flips()) {
        return TransitionResult::new(snapshot, vec![Effect::exceeded_reports()]);
    }

    let mut snapshot = snapshot;
    if let Some(flip) = snapshot.context_mut().long_flip_mut(hash) {
        flip.set_relevance(relevance);
    }
    snapshot.context_mut().recount_reports();
    TransitionResult::no_change(snapshot)
}

fn check_flips(snapshot: &mut ValidationSnapshot, index: i64) {
    let sequence = snapshot.context().sequence(SessionTier::Long);
    let target = usize::try_from(index)
        .ok()
        .filter(|index| *index < sequence.len())
        .or_else(|| first_unanswered_index(&sequence));
    if let Some(index) = target {
        snapshot.context_mut().set_current_index(index);
    }
}

fn check_reports(snapshot: &mut ValidationSnapshot) {
    let target = first_unmarked_index(&snapshot.context().sequence(SessionTier::Long));
    if let Some(index) = target {
        snapshot.context_mut().set_current_index(index);
    }
}
