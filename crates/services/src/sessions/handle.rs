use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::warn;
use validation_core::machine::{Event, ValidationSnapshot};

use super::runtime::Command;
use crate::error::SessionError;

/// Client side of a running validation session.
///
/// Events sent through the handle share one queue with deadline ticks and
/// submission results, so they are applied strictly in arrival order.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ValidationSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub(super) fn new(
        commands: mpsc::UnboundedSender<Command>,
        snapshots: watch::Receiver<ValidationSnapshot>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Queue an event for the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has stopped.
    pub fn send(&self, event: Event) -> Result<(), SessionError> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| SessionError::Closed)
    }

    /// Queue an event and wait until the session has applied it.
    ///
    /// Effects of the event, such as a submission, have been started but not
    /// necessarily finished when this returns.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task stops first.
    pub async fn apply(&self, event: Event) -> Result<ValidationSnapshot, SessionError> {
        let (applied, snapshot) = oneshot::channel();
        self.commands
            .send(Command::Apply { event, applied })
            .map_err(|_| SessionError::Closed)?;
        snapshot.await.map_err(|_| SessionError::Closed)
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ValidationSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every transition that changed the snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ValidationSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session stops first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&ValidationSnapshot) -> bool,
    ) -> Result<ValidationSnapshot, SessionError> {
        let mut snapshots = self.subscribe();
        let snapshot = snapshots
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Stop the session and wait for pending persistence to finish.
    ///
    /// Returns the last snapshot.
    pub async fn shutdown(self) -> ValidationSnapshot {
        // Already stopped when the send fails; joining still applies.
        let _ = self.commands.send(Command::Shutdown);
        if let Err(err) = self.task.await {
            warn!(error = %err, "validation session task failed");
        }
        self.snapshots.borrow().clone()
    }
}
