// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s stamped with the time they were
//! received and produces:
//! - an updated run state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - sending `ScheduledTask`s and cancellations to the executor
//! - reading the clock
//!
//! The core has no channels, no Tokio types, and performs no IO, so it can be
//! unit tested with hand-picked timestamps.

use std::time::Duration;

use crate::dag::{DagRun, ExecutionReport};
use crate::engine::RuntimeEvent;
use crate::engine::event_handlers::{
    CoreStep, handle_run_start, handle_shutdown, handle_task_completion,
};

/// Pure core runtime state: the single owner and mutator of the run state.
#[derive(Debug)]
pub struct CoreRuntime {
    run: DagRun,
}

impl CoreRuntime {
    pub fn new(run: DagRun) -> Self {
        Self { run }
    }

    pub fn run(&self) -> &DagRun {
        &self.run
    }

    pub fn is_finished(&self) -> bool {
        self.run.is_finished()
    }

    /// Begin the run: dispatch every task without dependencies.
    pub fn start(&mut self, now: Duration) -> CoreStep {
        handle_run_start(&mut self.run, now)
    }

    /// Handle a single event received at `now` (offset from the run start).
    pub fn step(&mut self, event: RuntimeEvent, now: Duration) -> CoreStep {
        let mut step = match event {
            RuntimeEvent::TaskCompleted { task, outcome } => {
                handle_task_completion(&mut self.run, task, outcome, now)
            }
            RuntimeEvent::ShutdownRequested => handle_shutdown(&mut self.run),
        };
        step.keep_running = step.keep_running && !self.run.is_finished();
        step
    }

    pub fn into_report(self, actual_runtime: Duration) -> ExecutionReport {
        self.run.into_report(actual_runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::{Scheduler, Task, TaskState};
    use crate::engine::{CoreCommand, TaskOutcome};

    fn core_for(tasks: Vec<Task>) -> CoreRuntime {
        let mut scheduler = Scheduler::from_tasks(tasks);
        CoreRuntime::new(scheduler.start_run().unwrap())
    }

    fn dispatched(step: &CoreStep) -> Vec<String> {
        step.commands
            .iter()
            .filter_map(|c| match c {
                CoreCommand::DispatchTasks(tasks) => Some(tasks.iter().map(|t| t.name.clone())),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn completed(task: &str) -> RuntimeEvent {
        RuntimeEvent::TaskCompleted {
            task: task.to_string(),
            outcome: TaskOutcome::Success,
        }
    }

    #[test]
    fn chain_runs_to_completion_and_requests_exit() {
        let mut core = core_for(vec![
            Task::new("A", 1, Vec::<&str>::new()),
            Task::new("B", 1, ["A"]),
        ]);

        let step = core.start(Duration::ZERO);
        assert_eq!(dispatched(&step), ["A"]);
        assert!(step.keep_running);

        let step = core.step(completed("A"), Duration::from_secs(1));
        assert_eq!(dispatched(&step), ["B"]);
        assert!(step.keep_running);

        let step = core.step(completed("B"), Duration::from_secs(2));
        assert!(!step.keep_running);
        assert_eq!(step.commands, vec![CoreCommand::RequestExit]);

        let report = core.into_report(Duration::from_secs(2));
        assert!(report.succeeded());
    }

    #[test]
    fn shutdown_cancels_running_tasks() {
        let mut core = core_for(vec![
            Task::new("A", 5, Vec::<&str>::new()),
            Task::new("B", 5, Vec::<&str>::new()),
            Task::new("C", 1, ["A"]),
        ]);
        core.start(Duration::ZERO);

        let step = core.step(RuntimeEvent::ShutdownRequested, Duration::from_secs(1));
        assert!(!step.keep_running);
        assert_eq!(
            step.commands,
            vec![
                CoreCommand::CancelTasks(vec!["A".to_string(), "B".to_string()]),
                CoreCommand::RequestExit,
            ]
        );
        assert_eq!(core.run().state_of("C"), Some(TaskState::Pending));
    }

    #[test]
    fn events_after_finish_stop_the_loop() {
        let mut core = core_for(vec![Task::new("A", 1, Vec::<&str>::new())]);
        core.start(Duration::ZERO);
        core.step(completed("A"), Duration::from_secs(1));

        let step = core.step(completed("A"), Duration::from_secs(2));
        assert!(!step.keep_running);
        assert!(step.commands.is_empty());
    }
}
