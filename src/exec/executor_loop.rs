// src/exec/executor_loop.rs

//! Main executor loop that manages running task units.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskName, TaskOutcome};
use crate::exec::task_runner::run_task;
use crate::exec::work::WorkUnit;
use crate::types::WakeupMode;

/// Requests sent from the backend to the executor loop.
#[derive(Debug)]
pub enum ExecutorCommand {
    Run(ScheduledTask),
    Cancel(TaskName),
}

/// Internal handle for a currently-running task unit.
///
/// - `cancel` stops the unit; dropping it has the same effect.
/// - `handle` resolves to the unit's outcome, or `None` if it was cancelled.
struct ActiveTask {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Option<TaskOutcome>>,
}

/// Spawn the background executor loop.
///
/// The returned sender is what [`RealExecutorBackend`](super::RealExecutorBackend)
/// uses. Each scheduled task runs in its own Tokio task; there is no limit on
/// how many run at once.
///
/// Completion reaches the runtime as `RuntimeEvent::TaskCompleted`:
/// - `WakeupMode::Signal`: each unit sends its own event when it returns.
/// - `WakeupMode::Poll`: this loop checks every `poll_interval` which units
///   have finished and queues the events on their behalf. The queue is
///   drained only when the runtime channel has room, so the loop keeps
///   accepting commands while the runtime is busy dispatching.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    work: Arc<dyn WorkUnit>,
    wakeup: WakeupMode,
    poll_interval: Duration,
) -> mpsc::Sender<ExecutorCommand> {
    let (tx, mut rx) = mpsc::channel::<ExecutorCommand>(32);

    tokio::spawn(async move {
        info!(?wakeup, ?poll_interval, "executor loop started");

        let mut active: HashMap<TaskName, ActiveTask> = HashMap::new();
        let mut outbox: VecDeque<RuntimeEvent> = VecDeque::new();
        let polling = wakeup == WakeupMode::Poll;
        let mut ticker = interval(poll_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(ExecutorCommand::Run(task)) => {
                        let notify = (!polling).then(|| runtime_tx.clone());
                        start_task(task, &work, notify, &mut active);
                    }
                    Some(ExecutorCommand::Cancel(name)) => {
                        cancel_task(&name, &mut active);
                    }
                    None => break,
                },
                _ = ticker.tick(), if polling => {
                    poll_finished(&mut active, &mut outbox).await;
                }
                permit = runtime_tx.reserve(), if !outbox.is_empty() => match permit {
                    Ok(permit) => {
                        if let Some(event) = outbox.pop_front() {
                            permit.send(event);
                        }
                    }
                    Err(_) => {
                        debug!(pending = outbox.len(), "runtime gone; dropping queued completions");
                        outbox.clear();
                    }
                },
            }

            if !polling {
                active.retain(|_, t| !t.handle.is_finished());
            }
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}

fn start_task(
    task: ScheduledTask,
    work: &Arc<dyn WorkUnit>,
    notify: Option<mpsc::Sender<RuntimeEvent>>,
    active: &mut HashMap<TaskName, ActiveTask>,
) {
    let name = task.name.clone();

    if let Some(existing) = active.get(&name) {
        if !existing.handle.is_finished() {
            warn!(task = %name, "task already running; ignoring duplicate dispatch");
            return;
        }
    }

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let work = Arc::clone(work);
    let spawn_name = name.clone();

    let handle = tokio::spawn(async move {
        // Run the unit in its own task so a panic becomes a failure instead
        // of a completion that never arrives.
        let outcome = match tokio::spawn(run_task(task, work, cancel_rx)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(task = %spawn_name, error = %e, "task unit panicked");
                Some(TaskOutcome::Failed(-1))
            }
        };

        if let (Some(outcome), Some(tx)) = (outcome, notify) {
            let sent = tx
                .send(RuntimeEvent::TaskCompleted {
                    task: spawn_name.clone(),
                    outcome,
                })
                .await;
            if sent.is_err() {
                debug!(task = %spawn_name, "runtime gone; dropping completion");
            }
        }

        debug!(task = %spawn_name, "task runner future finished");
        outcome
    });

    active.insert(
        name,
        ActiveTask {
            cancel: Some(cancel_tx),
            handle,
        },
    );
}

fn cancel_task(name: &str, active: &mut HashMap<TaskName, ActiveTask>) {
    let Some(mut existing) = active.remove(name) else {
        debug!(task = %name, "cancel for a task that is not running");
        return;
    };

    match existing.cancel.take() {
        Some(cancel) => {
            if cancel.send(()).is_err() {
                debug!(task = %name, "task already finished while cancelling");
            }
        }
        None => debug!(task = %name, "no cancel sender present"),
    }
}

/// Queue a completion event for every finished unit.
async fn poll_finished(
    active: &mut HashMap<TaskName, ActiveTask>,
    outbox: &mut VecDeque<RuntimeEvent>,
) {
    let finished: Vec<TaskName> = active
        .iter()
        .filter(|(_, t)| t.handle.is_finished())
        .map(|(name, _)| name.clone())
        .collect();

    for name in finished {
        let Some(entry) = active.remove(&name) else {
            continue;
        };

        let outcome = match entry.handle.await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => continue,
            Err(e) => {
                error!(task = %name, error = %e, "task unit panicked");
                TaskOutcome::Failed(-1)
            }
        };

        debug!(task = %name, ?outcome, "poll found finished task");
        outbox.push_back(RuntimeEvent::TaskCompleted {
            task: name,
            outcome,
        });
    }
}
