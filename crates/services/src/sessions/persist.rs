use std::sync::Arc;

use storage::repository::{ValidationStateRecord, ValidationStateRepository};
use tokio::sync::watch;
use tracing::warn;
use validation_core::machine::ValidationSnapshot;

use crate::Clock;

/// Write `snapshot` to the store.
///
/// A concluded session stays stored in its terminal state so a reload of the
/// same epoch cannot start over. Failures are logged and swallowed; the
/// session keeps running.
pub(super) async fn persist_snapshot(
    states: &dyn ValidationStateRepository,
    clock: Clock,
    snapshot: &ValidationSnapshot,
) {
    let epoch = snapshot.context().params().epoch();
    let record = ValidationStateRecord::from_snapshot(snapshot, clock.now());
    if let Err(err) = states.save_state(&record).await {
        warn!(%epoch, state = %snapshot.state(), error = %err, "failed to persist validation state");
    }
}

/// Persist every published snapshot until the session task drops its sender.
///
/// Intermediate snapshots published while a write is running are coalesced;
/// only the latest one is written next.
pub(super) async fn persistence_writer(
    states: Arc<dyn ValidationStateRepository>,
    clock: Clock,
    mut snapshots: watch::Receiver<ValidationSnapshot>,
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        persist_snapshot(states.as_ref(), clock, &snapshot).await;
    }
}
