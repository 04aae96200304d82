// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::time::Duration;

use crate::dag::{DagRun, ScheduledTask, SchedulerStep};
use crate::engine::{TaskName, TaskOutcome};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// Stop these running task units.
    CancelTasks(Vec<TaskName>),
    /// The run is over.
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

/// Dispatch the roots of the DAG.
pub fn handle_run_start(run: &mut DagRun, now: Duration) -> CoreStep {
    let step = run.step_start(now);
    commands_from_step(step)
}

/// Handle a task completion event.
pub fn handle_task_completion(
    run: &mut DagRun,
    task: TaskName,
    outcome: TaskOutcome,
    now: Duration,
) -> CoreStep {
    let step = run.step_completion(&task, outcome, now);
    commands_from_step(step)
}

/// Handle a shutdown request: cancel whatever is running and stop.
pub fn handle_shutdown(run: &mut DagRun) -> CoreStep {
    let step = run.step_cancel();
    let mut commands = Vec::new();
    if !step.newly_cancelled.is_empty() {
        commands.push(CoreCommand::CancelTasks(step.newly_cancelled));
    }
    commands.push(CoreCommand::RequestExit);

    CoreStep {
        commands,
        keep_running: false,
    }
}

fn commands_from_step(step: SchedulerStep) -> CoreStep {
    let mut commands = Vec::new();

    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchTasks(step.newly_scheduled));
    }

    let keep_running = !step.run_just_finished;
    if step.run_just_finished {
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}
