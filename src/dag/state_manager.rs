// src/dag/state_manager.rs

//! Per-run state transitions for tasks.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::dag::graph::{DagGraph, TaskMap};
use crate::dag::task_info::{ScheduledTask, TaskState};
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
///
/// Borrowed from a [`DagRun`](crate::dag::DagRun) for the duration of a
/// single step; the run stays the only owner of the state.
pub struct StateManager<'a> {
    graph: &'a DagGraph,
    order: &'a [TaskName],
    tasks: &'a mut TaskMap,
    states: &'a mut HashMap<TaskName, TaskState>,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a DagGraph,
        order: &'a [TaskName],
        tasks: &'a mut TaskMap,
        states: &'a mut HashMap<TaskName, TaskState>,
    ) -> Self {
        Self {
            graph,
            order,
            tasks,
            states,
        }
    }

    /// Whether every dependency of `task` has completed in this run.
    pub fn deps_satisfied(&self, task: &str) -> bool {
        ReadOnlyStateManager::new(self.graph, self.states).deps_satisfied(task)
    }

    /// Move every `Pending` task whose dependencies have all completed to
    /// `Ready`, then dispatch it (`Running`), recording `now` as its start.
    ///
    /// Tasks are visited in execution order, so dispatch order is
    /// deterministic.
    pub fn collect_new_ready_tasks(&mut self, now: Duration) -> Vec<ScheduledTask> {
        let candidates: Vec<TaskName> = self
            .order
            .iter()
            .filter(|name| {
                matches!(self.states.get(name.as_str()), Some(TaskState::Pending))
                    && self.deps_satisfied(name)
            })
            .cloned()
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());

        for name in candidates {
            self.states.insert(name.clone(), TaskState::Ready);
            debug!(task = %name, "dependencies completed; task ready");

            let Some(task) = self.tasks.get_mut(&name) else {
                warn!(task = %name, "ready task missing from registry");
                continue;
            };

            task.start_time = Some(now);
            info!(
                task = %name,
                duration = task.duration,
                at_ms = now.as_millis() as u64,
                "starting task"
            );
            ready.push(ScheduledTask::from_task(task));
            self.states.insert(name, TaskState::Running);
        }

        ready
    }

    /// Record the end of a running task.
    ///
    /// Returns `false` (and changes nothing) if the task is not running.
    pub fn finish_task(&mut self, task: &str, state: TaskState, now: Duration) -> bool {
        if !matches!(self.states.get(task), Some(TaskState::Running)) {
            return false;
        }

        if let Some(info) = self.tasks.get_mut(task) {
            info.end_time = Some(now);
            info.actual_duration = info.start_time.map(|start| now.saturating_sub(start));
        }
        self.states.insert(task.to_string(), state);
        true
    }

    /// Mark every pending transitive dependent of `failed_task` as `Blocked`.
    ///
    /// Returns the newly blocked tasks (excluding `failed_task` itself).
    pub fn mark_dependents_blocked(&mut self, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<TaskName> = self.graph.dependents_of(failed_task).to_vec();
        let mut newly_blocked = Vec::new();

        while let Some(name) = stack.pop() {
            if let Some(state) = self.states.get_mut(&name) {
                if matches!(state, TaskState::Pending | TaskState::Ready) {
                    *state = TaskState::Blocked;
                    debug!(
                        task = %name,
                        upstream = %failed_task,
                        "blocking dependent of failed task"
                    );
                    stack.extend(self.graph.dependents_of(&name).iter().cloned());
                    newly_blocked.push(name);
                }
            }
        }

        newly_blocked
    }

    /// Mark every running task as `Cancelled`.
    pub fn cancel_running(&mut self) -> Vec<TaskName> {
        let running: Vec<TaskName> = self
            .order
            .iter()
            .filter(|name| matches!(self.states.get(name.as_str()), Some(TaskState::Running)))
            .cloned()
            .collect();

        for name in &running {
            self.states.insert(name.clone(), TaskState::Cancelled);
        }

        running
    }

    pub fn all_tasks_terminal(&self) -> bool {
        ReadOnlyStateManager::new(self.graph, self.states).all_tasks_terminal()
    }
}

/// Read-only view for dependency checks when only shared access is available.
pub struct ReadOnlyStateManager<'a> {
    graph: &'a DagGraph,
    states: &'a HashMap<TaskName, TaskState>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(graph: &'a DagGraph, states: &'a HashMap<TaskName, TaskState>) -> Self {
        Self { graph, states }
    }

    /// A dependency counts only once it is `Completed`; scheduled or running
    /// is not enough.
    pub fn deps_satisfied(&self, task: &str) -> bool {
        self.graph.dependencies_of(task).iter().all(|dep| {
            matches!(self.states.get(dep.as_str()), Some(TaskState::Completed))
        })
    }

    pub fn all_tasks_terminal(&self) -> bool {
        self.states.values().all(|state| state.is_terminal())
    }
}
