// src/dag/task_info.rs

//! Task records and per-run task state.

use std::time::Duration;

use crate::engine::TaskName;

/// A named unit of work with a declared duration and its prerequisites.
///
/// The definition fields are fixed once the task is registered. The
/// observation fields (`start_time`, `end_time`, `actual_duration`) are only
/// written by the execution controller, measured from the start of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: TaskName,
    /// Declared duration in abstract time units.
    pub duration: u64,
    /// Direct dependencies, in declared order.
    pub dependencies: Vec<TaskName>,
    /// Optional shell command, only used by command-backed work units.
    pub cmd: Option<String>,

    pub start_time: Option<Duration>,
    pub end_time: Option<Duration>,
    pub actual_duration: Option<Duration>,
}

impl Task {
    pub fn new<N, I, D>(name: N, duration: u64, dependencies: I) -> Self
    where
        N: Into<TaskName>,
        I: IntoIterator<Item = D>,
        D: Into<TaskName>,
    {
        Self {
            name: name.into(),
            duration,
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            cmd: None,
            start_time: None,
            end_time: None,
            actual_duration: None,
        }
    }

    pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = Some(cmd.into());
        self
    }

    /// Clear observation fields before a new run.
    pub fn reset_observations(&mut self) {
        self.start_time = None;
        self.end_time = None;
        self.actual_duration = None;
    }
}

/// Per-run state of a task.
///
/// `Pending -> Ready -> Running -> Completed` is the normal path. A task whose
/// work unit reports failure ends in `Failed`; its dependents never start and
/// end in `Blocked`. `Cancelled` is for units that were running when the run
/// was interrupted. No state ever moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for dependencies.
    Pending,
    /// All dependencies completed; about to be dispatched.
    Ready,
    /// Dispatched to the executor.
    Running,
    Completed,
    Failed,
    /// A dependency failed (or was itself blocked).
    Blocked,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Blocked | TaskState::Cancelled
        )
    }
}

/// Description of a task that the controller wants the executor to run now.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub duration: u64,
    pub cmd: Option<String>,
}

impl ScheduledTask {
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            duration: task.duration,
            cmd: task.cmd.clone(),
        }
    }
}
