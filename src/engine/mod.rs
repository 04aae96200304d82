// src/engine/mod.rs

//! Execution engine.
//!
//! This module ties together:
//! - the per-run DAG state ([`crate::dag::DagRun`])
//! - the controller loop that reacts to:
//!   - task completion events
//!   - shutdown requests (Ctrl-C, run deadline)
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::Duration;

use crate::types::{DEFAULT_POLL_INTERVAL, DEFAULT_TIME_UNIT, WakeupMode};

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Outcome of a task unit for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(i32),
}

/// Options for one execution of the task set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOptions {
    /// Wall-clock length of one duration unit.
    pub time_unit: Duration,
    pub wakeup: WakeupMode,
    /// Liveness check interval for [`WakeupMode::Poll`].
    pub poll_interval: Duration,
    /// Cancel the run if it is still going after this long.
    pub deadline: Option<Duration>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            time_unit: DEFAULT_TIME_UNIT,
            wakeup: WakeupMode::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

/// Events flowing into the controller from executors and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task unit finished with a concrete outcome.
    TaskCompleted {
        task: TaskName,
        outcome: TaskOutcome,
    },
    /// Stop the run and cancel running units (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::CoreRuntime;
pub use self::event_handlers::{CoreCommand, CoreStep};
pub use self::runtime::Runtime;
