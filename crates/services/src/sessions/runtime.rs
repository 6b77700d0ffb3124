//! Session task: the single consumer of the event queue.
//!
//! The task owns the machine, applies one event at a time, publishes the new
//! snapshot, and executes the returned effects. Effects that wait on the
//! outside world (submission, notice dismissal) run on spawned tasks and
//! report back through the same queue.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use validation_core::machine::{
    Effect, Event, FlipAnswer, SessionTier, ValidationMachine, ValidationSnapshot,
};

use crate::Clock;
use crate::hooks::SessionHooks;
use crate::submission::{AnswerSubmitter, SubmissionRequest};

/// Messages accepted by the session task.
#[derive(Debug)]
pub(super) enum Command {
    Event(Event),
    /// Apply `event`, then answer with the resulting snapshot.
    Apply {
        event: Event,
        applied: oneshot::Sender<ValidationSnapshot>,
    },
    Shutdown,
}

/// Collaborators shared by the session task and the tasks it spawns.
pub(super) struct RuntimeContext {
    pub clock: Clock,
    pub submitter: Arc<dyn AnswerSubmitter>,
    pub hooks: Arc<dyn SessionHooks>,
    pub tick_interval: Duration,
}

pub(super) async fn run_session(
    mut machine: ValidationMachine,
    ctx: Arc<RuntimeContext>,
    commands_tx: mpsc::WeakUnboundedSender<Command>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<ValidationSnapshot>,
    writer: JoinHandle<()>,
) {
    let epoch = machine.context().params().epoch();
    let mut ticker = if machine.state().is_terminal() {
        None
    } else {
        Some(tokio::spawn(deadline_ticker(
            ctx.clock,
            ctx.tick_interval,
            commands_tx.clone(),
        )))
    };

    while let Some(command) = commands.recv().await {
        let (event, applied) = match command {
            Command::Event(event) => (event, None),
            Command::Apply { event, applied } => (event, Some(applied)),
            Command::Shutdown => break,
        };

        let name = event.name();
        let from = machine.state().path();
        let effects = machine.send(event);
        let to = machine.state().path();
        if from == to {
            debug!(%epoch, event = name, state = %to, "event applied");
        } else {
            info!(%epoch, event = name, %from, %to, "state transition");
        }

        let snapshot = machine.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == *snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });

        for effect in effects {
            execute_effect(&ctx, &machine, &commands_tx, effect);
        }
        if let Some(applied) = applied {
            // The caller may have stopped waiting.
            let _ = applied.send(machine.snapshot().clone());
        }

        if machine.state().is_terminal() {
            if let Some(ticker) = ticker.take() {
                ticker.abort();
                debug!(%epoch, "deadline ticker stopped");
            }
        }
    }

    if let Some(ticker) = ticker.take() {
        ticker.abort();
    }
    // Closing the channel lets the writer drain the last snapshot and exit.
    drop(snapshots);
    if let Err(err) = writer.await {
        warn!(%epoch, error = %err, "persistence writer failed");
    }
    info!(%epoch, state = %machine.state(), "validation session stopped");
}

fn execute_effect(
    ctx: &Arc<RuntimeContext>,
    machine: &ValidationMachine,
    commands: &mpsc::WeakUnboundedSender<Command>,
    effect: Effect,
) {
    match effect {
        Effect::SubmitAnswers {
            tier,
            attempt,
            answers,
        } => spawn_submission(ctx, machine, commands, tier, attempt, answers),
        Effect::RefetchFlips { hashes } => {
            debug!(count = hashes.len(), "requesting flip refetch");
            ctx.hooks.on_refetch_flips(&hashes);
        }
        Effect::ExceededReports { dismiss_after } => {
            ctx.hooks.on_exceeded_reports();
            let hooks = Arc::clone(&ctx.hooks);
            tokio::spawn(async move {
                tokio::time::sleep(dismiss_after).await;
                hooks.on_exceeded_reports_dismissed();
            });
        }
        Effect::ValidationSucceeded => ctx.hooks.on_validation_succeeded(),
        Effect::ValidationFailed { reason } => {
            warn!(epoch = %machine.context().params().epoch(), %reason, "validation failed");
            ctx.hooks.on_validation_failed(reason);
        }
    }
}

fn spawn_submission(
    ctx: &Arc<RuntimeContext>,
    machine: &ValidationMachine,
    commands: &mpsc::WeakUnboundedSender<Command>,
    tier: SessionTier,
    attempt: u32,
    answers: Vec<FlipAnswer>,
) {
    let params = machine.context().params();
    let request = SubmissionRequest {
        epoch: params.epoch(),
        coinbase: params.coinbase().to_string(),
        tier,
        attempt,
        answers,
        credential: params.credential().clone(),
    };
    let submitter = Arc::clone(&ctx.submitter);
    let commands = commands.clone();

    info!(epoch = %request.epoch, %tier, attempt, answers = request.answers.len(), "submitting answers");
    tokio::spawn(async move {
        let event = match submitter.submit(request).await {
            Ok(()) => Event::SubmitSucceeded { attempt },
            Err(err) => {
                warn!(%tier, attempt, error = %err, "submission failed");
                Event::SubmitFailed {
                    attempt,
                    error: err.to_string(),
                }
            }
        };
        match commands.upgrade() {
            Some(sender) if sender.send(Command::Event(event)).is_ok() => {}
            _ => debug!(attempt, "session stopped before submission result arrived"),
        }
    });
}

/// Feed `TICK` events into the queue until the session goes away.
async fn deadline_ticker(
    clock: Clock,
    period: Duration,
    commands: mpsc::WeakUnboundedSender<Command>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let Some(sender) = commands.upgrade() else {
            break;
        };
        if sender
            .send(Command::Event(Event::Tick { now: clock.now() }))
            .is_err()
        {
            break;
        }
    }
}
