// src/config/model.rs

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::dag::Task;
use crate::engine::ExecutionOptions;
use crate::types::WakeupMode;

/// Task file in TOML form.
///
/// ```toml
/// [config]
/// time_unit_ms = 1000
/// wakeup = "signal"
///
/// [task.build]
/// duration = 3
///
/// [task.test]
/// duration = 2
/// after = ["build"]
/// cmd = "cargo test"
/// ```
///
/// Task tables are kept as raw values so that one malformed task only skips
/// that task (see [`TaskEntry`]).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTaskFile {
    #[serde(default)]
    pub config: EngineSection,

    /// Keys are the task names, in file order.
    #[serde(default)]
    pub task: IndexMap<String, toml::Value>,
}

/// `[config]` section: execution settings. Every field is optional.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Milliseconds per duration unit.
    #[serde(default)]
    pub time_unit_ms: Option<u64>,

    /// `"signal"` or `"poll"`.
    #[serde(default)]
    pub wakeup: Option<WakeupMode>,

    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    /// Cancel the run after this many milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl EngineSection {
    /// Overlay the values present in this section onto `options`.
    pub fn apply_to(&self, options: &mut ExecutionOptions) {
        if let Some(ms) = self.time_unit_ms {
            options.time_unit = Duration::from_millis(ms);
        }
        if let Some(wakeup) = self.wakeup {
            options.wakeup = wakeup;
        }
        if let Some(ms) = self.poll_interval_ms {
            options.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.deadline_ms {
            options.deadline = Some(Duration::from_millis(ms));
        }
    }
}

/// `[task.<name>]` table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TaskEntry {
    /// Declared duration in time units.
    pub duration: u64,

    /// Dependencies: this task waits for every task listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Optional shell command to run instead of sleeping.
    #[serde(default)]
    pub cmd: Option<String>,
}

impl TaskEntry {
    pub fn into_task(self, name: &str) -> Task {
        let task = Task::new(name, self.duration, self.after);
        match self.cmd {
            Some(cmd) => task.with_cmd(cmd),
            None => task,
        }
    }
}

/// A task definition that was skipped while reading a task file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputWarning {
    #[error("Skipping invalid row {row}: {content}")]
    InvalidRow { row: usize, content: String },

    #[error("Invalid duration in row {row}: {value}")]
    InvalidDuration { row: usize, value: String },

    #[error("Skipping invalid task '{name}': {reason}")]
    InvalidTask { name: String, reason: String },
}

/// Result of reading a task file: the usable tasks, the skipped entries and
/// any execution settings the file carries.
#[derive(Debug, Clone, Default)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    pub warnings: Vec<InputWarning>,
    pub engine: EngineSection,
}
