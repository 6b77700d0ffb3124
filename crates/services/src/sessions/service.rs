use std::sync::Arc;
use std::time::Duration;

use storage::repository::{StorageError, ValidationStateRecord, ValidationStateRepository};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use validation_core::machine::{ValidationMachine, ValidationState};
use validation_core::model::{Epoch, Flip, SessionParams};

use super::handle::SessionHandle;
use super::persist::{persist_snapshot, persistence_writer};
use super::runtime::{RuntimeContext, run_session};
use crate::Clock;
use crate::error::SessionError;
use crate::hooks::{NoopHooks, SessionHooks};
use crate::submission::AnswerSubmitter;

/// Period of the deadline ticker.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Entry point that restores or starts validation sessions.
#[derive(Clone)]
pub struct ValidationSessionService {
    clock: Clock,
    states: Arc<dyn ValidationStateRepository>,
    submitter: Arc<dyn AnswerSubmitter>,
    hooks: Arc<dyn SessionHooks>,
    tick_interval: Duration,
}

impl ValidationSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        states: Arc<dyn ValidationStateRepository>,
        submitter: Arc<dyn AnswerSubmitter>,
    ) -> Self {
        Self {
            clock,
            states,
            submitter,
            hooks: Arc::new(NoopHooks),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Resume the persisted session for `params.epoch()`, or start a new one.
    ///
    /// The flip lists are only used for a new session; a resumed session keeps
    /// the lists stored with it. A session that already concluded for this
    /// epoch resumes in its terminal state. Records of other epochs are
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store cannot be read or the stored
    /// session belongs to another epoch.
    pub async fn start(
        &self,
        params: SessionParams,
        short_flips: Vec<Flip>,
        long_flips: Vec<Flip>,
    ) -> Result<SessionHandle, SessionError> {
        let epoch = params.epoch();
        if let Err(err) = self.states.clear_other_epochs(epoch).await {
            warn!(%epoch, error = %err, "failed to clear earlier validation states");
        }

        let machine = match self.load_saved(epoch).await? {
            Some(record) => {
                let machine = ValidationMachine::restore(params, record.into_snapshot())?;
                if machine.state().is_terminal() {
                    info!(%epoch, state = %machine.state(), "validation session already concluded");
                } else {
                    info!(%epoch, state = %machine.state(), "resumed validation session");
                }
                machine
            }
            None => {
                let machine =
                    ValidationMachine::start(params, short_flips, long_flips, self.clock.now());
                info!(%epoch, state = %machine.state(), "started validation session");
                machine
            }
        };

        persist_snapshot(self.states.as_ref(), self.clock, machine.snapshot()).await;
        if let ValidationState::ValidationFailed(reason) = machine.state() {
            self.hooks.on_validation_failed(*reason);
        }

        let (snapshots_tx, snapshots_rx) = watch::channel(machine.snapshot().clone());
        let writer = tokio::spawn(persistence_writer(
            Arc::clone(&self.states),
            self.clock,
            snapshots_rx.clone(),
        ));

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(RuntimeContext {
            clock: self.clock,
            submitter: Arc::clone(&self.submitter),
            hooks: Arc::clone(&self.hooks),
            tick_interval: self.tick_interval,
        });
        let task = tokio::spawn(run_session(
            machine,
            ctx,
            commands_tx.downgrade(),
            commands_rx,
            snapshots_tx,
            writer,
        ));

        Ok(SessionHandle::new(commands_tx, snapshots_rx, task))
    }

    /// Load the stored record; an undecodable one is discarded and reads as none.
    async fn load_saved(&self, epoch: Epoch) -> Result<Option<ValidationStateRecord>, SessionError> {
        match self.states.load_state(epoch).await {
            Ok(record) => Ok(record),
            Err(StorageError::Serialization(reason)) => {
                warn!(%epoch, %reason, "discarding undecodable validation state");
                if let Err(err) = self.states.clear_state(epoch).await {
                    warn!(%epoch, error = %err, "failed to clear undecodable validation state");
                }
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
