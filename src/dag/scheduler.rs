use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::estimate::{Estimate, estimate};
use crate::dag::graph::{DagGraph, TaskMap};
use crate::dag::run::{DagRun, ExecutionReport};
use crate::dag::task_info::Task;
use crate::engine::{CoreRuntime, ExecutionOptions, Runtime, RuntimeEvent, TaskName};
use crate::errors::{Result, TaskplanError};
use crate::exec::{ExecutorBackend, RealExecutorBackend, WorkUnit};

/// Owns the task registry and everything derived from it.
///
/// - registering tasks (`add_task`)
/// - validating the graph and caching the execution order
/// - the critical-path estimate
/// - running the tasks and keeping the observed timings
///
/// Registering a task invalidates the cached order and estimate.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: TaskMap,
    execution_order: Option<Vec<TaskName>>,
    estimate: Option<Estimate>,
    actual_runtime: Option<Duration>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut scheduler = Self::new();
        for task in tasks {
            scheduler.add_task(task);
        }
        scheduler
    }

    /// Register a task.
    ///
    /// A task with an already registered name replaces the earlier record
    /// but keeps its position in the registry.
    pub fn add_task(&mut self, task: Task) {
        if self.tasks.contains_key(&task.name) {
            warn!(task = %task.name, "task registered twice; keeping the last definition");
        }
        self.tasks.insert(task.name.clone(), task);
        self.execution_order = None;
        self.estimate = None;
        self.actual_runtime = None;
    }

    pub fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn graph(&self) -> DagGraph {
        DagGraph::from_tasks(&self.tasks)
    }

    /// Check dependency references and compute the execution order.
    ///
    /// Every missing dependency is reported in one batch; a cycle is only
    /// looked for once all references resolve. Nothing is cached on failure.
    pub fn validate(&mut self) -> Result<&[TaskName]> {
        if self.execution_order.is_none() {
            let graph = self.graph();
            match graph.validate() {
                Ok(order) => {
                    debug!(?order, "task graph valid");
                    self.execution_order = Some(order);
                }
                Err(errors) => {
                    warn!(errors = errors.len(), "task graph invalid");
                    return Err(errors.into());
                }
            }
        }
        Ok(self.execution_order.as_deref().unwrap_or_default())
    }

    /// The cached execution order, if validation has succeeded.
    pub fn execution_order(&self) -> Option<&[TaskName]> {
        self.execution_order.as_deref()
    }

    /// Critical-path estimate, validating first if needed.
    pub fn estimate(&mut self) -> Result<&Estimate> {
        if self.estimate.is_none() {
            let order = self.validate()?.to_vec();
            let est = estimate(&order, &self.tasks)?;
            info!(
                expected_runtime = est.total,
                critical_path = ?est.critical_path(),
                "computed expected runtime"
            );
            self.estimate = Some(est);
        }
        self.estimate.as_ref().ok_or(TaskplanError::NotValidated)
    }

    /// Expected makespan in duration units under unlimited parallelism.
    pub fn calculate_expected_runtime(&mut self) -> Result<u64> {
        Ok(self.estimate()?.total)
    }

    pub fn expected_runtime(&self) -> Option<u64> {
        self.estimate.as_ref().map(|e| e.total)
    }

    /// Observed makespan of the last run.
    pub fn actual_runtime(&self) -> Option<Duration> {
        self.actual_runtime
    }

    /// Build the per-run state for a fresh execution.
    pub fn start_run(&mut self) -> Result<DagRun> {
        let order = self.validate()?.to_vec();
        Ok(DagRun::new(self.graph(), order, self.tasks.clone()))
    }

    /// Run every task with the real executor.
    pub async fn run_tasks(
        &mut self,
        options: &ExecutionOptions,
        work: Arc<dyn WorkUnit>,
    ) -> Result<ExecutionReport> {
        let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
        self.run_tasks_with_events(options, work, rt_tx, rt_rx).await
    }

    /// Like [`Scheduler::run_tasks`], with a caller-provided event channel so
    /// other sources (e.g. Ctrl-C) can send [`RuntimeEvent::ShutdownRequested`].
    pub async fn run_tasks_with_events(
        &mut self,
        options: &ExecutionOptions,
        work: Arc<dyn WorkUnit>,
        rt_tx: mpsc::Sender<RuntimeEvent>,
        rt_rx: mpsc::Receiver<RuntimeEvent>,
    ) -> Result<ExecutionReport> {
        let executor = RealExecutorBackend::new(rt_tx, work, options);
        self.run_with_executor(executor, rt_rx, options).await
    }

    /// Run every task through the given executor backend.
    pub async fn run_with_executor<E: ExecutorBackend>(
        &mut self,
        executor: E,
        rt_rx: mpsc::Receiver<RuntimeEvent>,
        options: &ExecutionOptions,
    ) -> Result<ExecutionReport> {
        let run = self.start_run()?;
        let core = CoreRuntime::new(run);
        let runtime = Runtime::new(core, rt_rx, executor, options.deadline);

        let report = runtime.run().await?;
        self.record_observations(&report);
        Ok(report)
    }

    fn record_observations(&mut self, report: &ExecutionReport) {
        for (name, observed) in report.tasks.iter() {
            if let Some(task) = self.tasks.get_mut(name) {
                task.start_time = observed.start_time;
                task.end_time = observed.end_time;
                task.actual_duration = observed.actual_duration;
            }
        }
        self.actual_runtime = Some(report.actual_runtime);
    }
}
