// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::dag::{ExecutionReport, ScheduledTask};
use crate::errors::Result;
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the run in response to `RuntimeEvent`s and delegates task
/// execution to an `ExecutorBackend`.
///
/// This is the IO shell around `CoreRuntime`: it reads the clock, waits for
/// events (or the deadline) and carries out the core's commands. All run
/// semantics live in the core.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    deadline: Option<Duration>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            core,
            event_rx,
            executor,
            deadline,
        }
    }

    /// Main event loop.
    ///
    /// - Starts the run (dispatches the roots).
    /// - Feeds completion / shutdown events into the core, stamped with the
    ///   time since the run started.
    /// - Executes the commands returned by the core.
    ///
    /// Returns once every task is terminal or the run was interrupted.
    pub async fn run(mut self) -> Result<ExecutionReport> {
        let started = Instant::now();
        let deadline_at = self.deadline.map(|d| started + d);
        info!(deadline = ?self.deadline, "runtime started");

        let step = self.core.start(Duration::ZERO);
        let mut keep_running = step.keep_running;
        for command in step.commands {
            self.execute_command(command).await?;
        }

        let mut last_event_at = Duration::ZERO;

        while keep_running {
            let event = tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(e) => e,
                    None => {
                        return Err(anyhow!(
                            "runtime event channel closed before the run finished"
                        )
                        .into());
                    }
                },
                _ = wait_for_deadline(deadline_at) => {
                    warn!(deadline = ?self.deadline, "run deadline reached");
                    RuntimeEvent::ShutdownRequested
                }
            };

            last_event_at = started.elapsed();
            debug!(?event, at_ms = last_event_at.as_millis() as u64, "runtime received event");

            let step = self.core.step(event, last_event_at);
            for command in step.commands {
                self.execute_command(command).await?;
            }
            keep_running = step.keep_running;
        }

        info!(
            actual_runtime_ms = last_event_at.as_millis() as u64,
            "runtime exiting"
        );
        Ok(self.core.into_report(last_event_at))
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(tasks) => {
                self.spawn_ready(tasks).await?;
            }
            CoreCommand::CancelTasks(names) => {
                info!(?names, "cancelling running tasks");
                self.executor.cancel_tasks(names).await?;
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn spawn_ready(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        debug!(?names, "spawning ready tasks");

        self.executor.spawn_ready_tasks(tasks).await
    }
}

async fn wait_for_deadline(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
