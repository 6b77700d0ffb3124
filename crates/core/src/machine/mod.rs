//! Validation session state machine.
//!
//! The machine is a pure function from (snapshot, event) to (snapshot,
//! effects). Timers, submission and persistence live in the services layer,
//! which feeds every event through one queue and executes the returned effects.

mod context;
mod effect;
mod event;
pub mod predicates;
mod snapshot;
mod state;
mod transition;

#[cfg(test)]
mod test_support;

pub use context::SessionContext;
pub use effect::{EXCEEDED_REPORTS_NOTICE, Effect, FlipAnswer};
pub use event::{Event, Translations};
pub use snapshot::{INTERRUPTED_SUBMISSION, ValidationMachine, ValidationSnapshot};
pub use state::{
    FailureReason, LongSessionState, SessionTier, ShortSessionState, SubmitStep, ValidationState,
};
pub use transition::{TransitionResult, transition};
