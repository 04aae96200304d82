// src/dag/run.rs

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dag::graph::{DagGraph, TaskMap};
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{ScheduledTask, TaskState};
use crate::engine::{TaskName, TaskOutcome};

/// State of a single execution of a validated task set.
///
/// Holds the graph, the execution order, a private copy of the task records
/// (whose observation fields it fills in) and the per-task [`TaskState`].
/// All transitions go through the `step_*` / `handle_*` methods; times are
/// offsets from the start of the run supplied by the caller, so the run
/// itself never reads a clock.
#[derive(Debug)]
pub struct DagRun {
    graph: DagGraph,
    order: Vec<TaskName>,
    tasks: TaskMap,
    states: HashMap<TaskName, TaskState>,
    started: bool,
    finished: bool,
    interrupted: bool,
}

impl DagRun {
    /// `order` must be a valid topological order of `tasks`.
    pub fn new(graph: DagGraph, order: Vec<TaskName>, mut tasks: TaskMap) -> Self {
        for task in tasks.values_mut() {
            task.reset_observations();
        }
        let states = order
            .iter()
            .map(|name| (name.clone(), TaskState::Pending))
            .collect();

        Self {
            graph,
            order,
            tasks,
            states,
            started: false,
            finished: false,
            interrupted: false,
        }
    }

    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.states.get(task).copied()
    }

    /// Whether all dependencies of `task` have completed.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        if !self.states.contains_key(task) {
            return None;
        }
        Some(ReadOnlyStateManager::new(&self.graph, &self.states).deps_satisfied(task))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    pub fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    /// Names of tasks currently running, in execution order.
    pub fn running_tasks(&self) -> Vec<TaskName> {
        self.tasks_in(TaskState::Running)
    }

    fn tasks_in(&self, state: TaskState) -> Vec<TaskName> {
        self.order
            .iter()
            .filter(|name| self.states.get(name.as_str()) == Some(&state))
            .cloned()
            .collect()
    }

    /// Start the run (production API).
    pub fn handle_start(&mut self, now: Duration) -> Vec<ScheduledTask> {
        self.step_start(now).newly_scheduled
    }

    /// Handle completion of a task unit (production API).
    pub fn handle_completion(
        &mut self,
        task: &str,
        outcome: TaskOutcome,
        now: Duration,
    ) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome, now).newly_scheduled
    }

    /// Dispatch every task without dependencies.
    pub fn step_start(&mut self, now: Duration) -> SchedulerStep {
        if self.started {
            warn!("step_start called on a run that already started; ignoring");
            return SchedulerStep::default();
        }
        self.started = true;
        info!(tasks = self.order.len(), "starting DAG run");

        let newly_scheduled = self.manager().collect_new_ready_tasks(now);
        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            run_just_finished,
            ..SchedulerStep::default()
        }
    }

    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome, now: Duration) -> SchedulerStep {
        if !self.started || self.finished {
            warn!(task = %task, "completion outside an active run; ignoring");
            return SchedulerStep::default();
        }

        let mut step = SchedulerStep::default();

        match outcome {
            TaskOutcome::Success => {
                if !self.manager().finish_task(task, TaskState::Completed, now) {
                    warn!(task = %task, "completion for a task that is not running; ignoring");
                    return step;
                }
                debug!(task = %task, at_ms = now.as_millis() as u64, "task completed");
                step.newly_scheduled = self.manager().collect_new_ready_tasks(now);
            }
            TaskOutcome::Failed(code) => {
                if !self.manager().finish_task(task, TaskState::Failed, now) {
                    warn!(task = %task, "failure for a task that is not running; ignoring");
                    return step;
                }
                warn!(
                    task = %task,
                    exit_code = code,
                    "task failed; blocking its dependents"
                );
                step.newly_failed.push(task.to_string());
                let mut blocked = self.manager().mark_dependents_blocked(task);
                step.newly_failed.append(&mut blocked);
            }
        }

        step.run_just_finished = self.maybe_finish_run();
        step
    }

    /// Cancel every running task and end the run as interrupted.
    ///
    /// Pending tasks stay `Pending`; they never start.
    pub fn step_cancel(&mut self) -> SchedulerStep {
        if self.finished {
            return SchedulerStep::default();
        }

        let newly_cancelled = self.manager().cancel_running();
        warn!(cancelled = ?newly_cancelled, "run interrupted; cancelling running tasks");

        self.interrupted = true;
        self.finished = true;

        SchedulerStep {
            newly_cancelled,
            run_just_finished: true,
            ..SchedulerStep::default()
        }
    }

    /// Package the final state of the run.
    pub fn into_report(self, actual_runtime: Duration) -> ExecutionReport {
        ExecutionReport {
            actual_runtime,
            order: self.order,
            tasks: self.tasks,
            states: self.states,
            interrupted: self.interrupted,
        }
    }

    fn manager(&mut self) -> StateManager<'_> {
        StateManager::new(&self.graph, &self.order, &mut self.tasks, &mut self.states)
    }

    /// Returns `true` if this call transitioned the run to finished.
    fn maybe_finish_run(&mut self) -> bool {
        if self.finished {
            return false;
        }

        if self.manager().all_tasks_terminal() {
            info!("all tasks terminal; run finished");
            self.finished = true;
            true
        } else {
            false
        }
    }
}

/// Outcome of one execution: observed timings and final task states.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Elapsed time from the start of the run to the last completion.
    pub actual_runtime: Duration,
    pub order: Vec<TaskName>,
    /// Task records with observation fields filled in.
    pub tasks: TaskMap,
    pub states: HashMap<TaskName, TaskState>,
    /// The run was cancelled before every task finished.
    pub interrupted: bool,
}

impl ExecutionReport {
    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.states.get(task).copied()
    }

    /// Tasks in the given state, in execution order.
    pub fn tasks_in(&self, state: TaskState) -> Vec<TaskName> {
        self.order
            .iter()
            .filter(|name| self.states.get(name.as_str()) == Some(&state))
            .cloned()
            .collect()
    }

    pub fn failed(&self) -> Vec<TaskName> {
        self.tasks_in(TaskState::Failed)
    }

    pub fn blocked(&self) -> Vec<TaskName> {
        self.tasks_in(TaskState::Blocked)
    }

    /// Every task completed and the run was not interrupted.
    pub fn succeeded(&self) -> bool {
        !self.interrupted
            && self
                .states
                .values()
                .all(|state| *state == TaskState::Completed)
    }
}
