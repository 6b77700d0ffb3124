//! Outbound notifications consumed by the UI layer.

use validation_core::machine::FailureReason;
use validation_core::model::FlipHash;

/// UI callbacks fired by the session runtime.
///
/// Every method defaults to a no-op. Hooks run on the session task, right
/// after the transition that produced them, so they must not block.
pub trait SessionHooks: Send + Sync {
    /// A report mark was rejected because the quota is used up.
    fn on_exceeded_reports(&self) {}

    /// The exceeded-reports notice should be hidden again.
    fn on_exceeded_reports_dismissed(&self) {}

    /// The flip loader should fetch these flips again.
    fn on_refetch_flips(&self, _hashes: &[FlipHash]) {}

    fn on_validation_succeeded(&self) {}

    fn on_validation_failed(&self, _reason: FailureReason) {}
}

/// Hooks that ignore every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl SessionHooks for NoopHooks {}
