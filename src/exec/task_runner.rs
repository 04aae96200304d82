// src/exec/task_runner.rs

//! Individual task unit runner.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::dag::ScheduledTask;
use crate::engine::TaskOutcome;
use crate::exec::work::WorkUnit;

/// Run a single task unit until it finishes or is cancelled.
///
/// Returns `None` if the cancel channel fired or its sender was dropped; the
/// unit's future is dropped at that point (child processes are killed on
/// drop), and no completion must be reported for it.
pub async fn run_task(
    task: ScheduledTask,
    work: Arc<dyn WorkUnit>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Option<TaskOutcome> {
    debug!(task = %task.name, duration = task.duration, "task unit started");

    tokio::select! {
        outcome = work.run(&task) => {
            info!(task = %task.name, ?outcome, "task unit finished");
            Some(outcome)
        }

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => info!(task = %task.name, "cancellation requested; stopping task unit"),
                Err(_) => debug!(
                    task = %task.name,
                    "cancel channel closed without explicit cancellation; stopping task unit"
                ),
            }
            None
        }
    }
}
