// src/dag/scheduler_step.rs

//! Step-by-step execution result types for a DAG run.

use crate::dag::task_info::ScheduledTask;
use crate::engine::TaskName;

/// Structured result of a single run "step".
///
/// Useful for tests that want to manually step the DAG and make assertions
/// about what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks that became ready and were dispatched in this step.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Tasks newly marked `Failed` or `Blocked` in this step.
    pub newly_failed: Vec<TaskName>,
    /// Tasks newly marked `Cancelled` in this step.
    pub newly_cancelled: Vec<TaskName>,
    /// Whether this step finished the run.
    pub run_just_finished: bool,
}
