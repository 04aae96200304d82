use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use taskplan::dag::ScheduledTask;
use taskplan::engine::{RuntimeEvent, TaskName, TaskOutcome};
use taskplan::errors::Result;
use taskplan::exec::ExecutorBackend;

/// In-process stand-in for `RealExecutorBackend`.
///
/// Every dispatched task "finishes" at once: its name is recorded and a
/// `TaskCompleted` event is queued, `Failed(1)` for names registered with
/// [`FakeExecutor::failing`] and `Success` otherwise. Cancellations are only
/// recorded.
///
/// Completions go through an unbounded queue drained by a forwarding task,
/// because the runtime is not receiving while it waits on
/// `spawn_ready_tasks`. Must be created inside a Tokio runtime.
pub struct FakeExecutor {
    completions: mpsc::UnboundedSender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<TaskName>>>,
    cancelled: Arc<Mutex<Vec<TaskName>>>,
    failing: HashSet<TaskName>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        executed: Arc<Mutex<Vec<TaskName>>>,
    ) -> Self {
        let (completions, mut queued) = mpsc::unbounded_channel::<RuntimeEvent>();
        tokio::spawn(async move {
            while let Some(event) = queued.recv().await {
                if runtime_tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Self {
            completions,
            executed,
            cancelled: Arc::new(Mutex::new(Vec::new())),
            failing: HashSet::new(),
        }
    }

    /// Report `task` as failed instead of succeeded.
    pub fn failing(mut self, task: &str) -> Self {
        self.failing.insert(task.to_string());
        self
    }

    pub fn cancelled(&self) -> Arc<Mutex<Vec<TaskName>>> {
        Arc::clone(&self.cancelled)
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let completions = self.completions.clone();
        let executed = Arc::clone(&self.executed);
        let failing = self.failing.clone();

        Box::pin(async move {
            for t in tasks {
                executed.lock().unwrap().push(t.name.clone());

                let outcome = if failing.contains(&t.name) {
                    TaskOutcome::Failed(1)
                } else {
                    TaskOutcome::Success
                };

                completions
                    .send(RuntimeEvent::TaskCompleted {
                        task: t.name,
                        outcome,
                    })
                    .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }

    fn cancel_tasks(
        &mut self,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let cancelled = Arc::clone(&self.cancelled);
        Box::pin(async move {
            cancelled.lock().unwrap().extend(tasks);
            Ok(())
        })
    }
}
