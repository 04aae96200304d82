// src/errors.rs

//! Crate-wide error types.

use std::fmt;

use thiserror::Error;

use crate::engine::TaskName;

/// Structural problem with the dependency graph.
///
/// Validation collects every `MissingDependency` before reporting, so a
/// caller usually sees these in a batch (see [`TaskplanError::Validation`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Task '{task}' depends on missing task '{dependency}'")]
    MissingDependency { task: TaskName, dependency: TaskName },

    #[error("Circular dependency detected: {}", describe_cycle(.cycle, .unordered))]
    Cycle {
        /// Tasks that sit on a dependency cycle.
        cycle: Vec<TaskName>,
        /// Every task the topological sort could not place (the cycle plus
        /// anything downstream of it).
        unordered: Vec<TaskName>,
    },
}

fn describe_cycle(cycle: &[TaskName], unordered: &[TaskName]) -> String {
    if cycle.is_empty() {
        format!(
            "among the remaining unordered tasks [{}]",
            unordered.join(", ")
        )
    } else {
        format!(
            "cycle through [{}] (unordered tasks: [{}])",
            cycle.join(", "),
            unordered.join(", ")
        )
    }
}

/// List of graph errors, displayed one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphErrors(pub Vec<GraphError>);

impl fmt::Display for GraphErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {err}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum TaskplanError {
    #[error("Task validation failed:\n{0}")]
    Validation(GraphErrors),

    #[error("Invalid task file: {0}")]
    Input(String),

    #[error("No valid tasks found")]
    NoTasks,

    #[error("Task list has not been validated")]
    NotValidated,

    #[error("Expected runtime overflows at task '{task}'")]
    DurationOverflow { task: TaskName },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskplanError {
    /// The individual graph errors if this is a validation failure.
    pub fn graph_errors(&self) -> &[GraphError] {
        match self {
            TaskplanError::Validation(errors) => &errors.0,
            _ => &[],
        }
    }
}

impl From<Vec<GraphError>> for TaskplanError {
    fn from(errors: Vec<GraphError>) -> Self {
        TaskplanError::Validation(GraphErrors(errors))
    }
}

pub type Result<T> = std::result::Result<T, TaskplanError>;
