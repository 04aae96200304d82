// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of a raw mpsc sender.
//! This makes it easy to swap in a fake executor in tests while keeping the
//! production executor implementation in [`executor_loop`](super::executor_loop).
//!
//! - `RealExecutorBackend` is the default implementation. It wraps the
//!   executor loop and forwards scheduled tasks and cancellations over an
//!   mpsc channel.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which tasks were scheduled and directly emits `TaskCompleted` events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::{ExecutionOptions, RuntimeEvent, TaskName};
use crate::errors::Result;

use super::executor_loop::{ExecutorCommand, spawn_executor};
use super::work::WorkUnit;

/// Trait abstracting how scheduled tasks are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given tasks for execution.
    ///
    /// Every task must eventually produce exactly one
    /// `RuntimeEvent::TaskCompleted`, unless it is cancelled.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Stop the given running tasks. No completion is reported for them.
    fn cancel_tasks(
        &mut self,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
///
/// The runtime calls `spawn_ready_tasks` / `cancel_tasks`, which forward to
/// the background executor loop via an mpsc channel.
pub struct RealExecutorBackend {
    tx: mpsc::Sender<ExecutorCommand>,
}

impl RealExecutorBackend {
    /// Create a new real executor backend, wiring it to the given runtime
    /// event sender.
    ///
    /// This spawns the background executor loop immediately, so it must be
    /// called from within a Tokio runtime.
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        work: Arc<dyn WorkUnit>,
        options: &ExecutionOptions,
    ) -> Self {
        let tx = spawn_executor(runtime_tx, work, options.wakeup, options.poll_interval);
        Self { tx }
    }

    fn send_all(
        &self,
        commands: Vec<ExecutorCommand>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            for command in commands {
                tx.send(command)
                    .await
                    .context("executor loop stopped")?;
            }
            Ok(())
        })
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.send_all(tasks.into_iter().map(ExecutorCommand::Run).collect())
    }

    fn cancel_tasks(
        &mut self,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.send_all(tasks.into_iter().map(ExecutorCommand::Cancel).collect())
    }
}
