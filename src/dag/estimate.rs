// src/dag/estimate.rs

//! Critical-path runtime estimate under unlimited parallelism.

use std::collections::HashMap;

use crate::dag::graph::TaskMap;
use crate::engine::TaskName;
use crate::errors::{Result, TaskplanError};

/// Earliest start/finish of every task and the resulting makespan, in
/// duration units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    /// Longest duration-weighted path through the graph.
    pub total: u64,
    earliest_start: HashMap<TaskName, u64>,
    /// For each task, the dependency whose finish determined its start.
    critical_dep: HashMap<TaskName, TaskName>,
    /// Task that finishes last (first in order on ties).
    last: Option<TaskName>,
}

impl Estimate {
    pub fn earliest_start(&self, task: &str) -> Option<u64> {
        self.earliest_start.get(task).copied()
    }

    /// Critical path from a root to the last-finishing task.
    ///
    /// When two dependencies finish at the same time, the one declared first
    /// is followed.
    pub fn critical_path(&self) -> Vec<TaskName> {
        let mut path = Vec::new();
        let mut current = self.last.clone();
        while let Some(name) = current {
            current = self.critical_dep.get(&name).cloned();
            path.push(name);
        }
        path.reverse();
        path
    }
}

/// Single pass over `order`: a task starts when its slowest dependency
/// finishes, or at 0 without dependencies.
///
/// `order` must be a topological order of `tasks`; names missing from
/// `tasks` are skipped. Fails with [`TaskplanError::DurationOverflow`] if a
/// path through the graph sums to more than `u64::MAX` units.
pub fn estimate(order: &[TaskName], tasks: &TaskMap) -> Result<Estimate> {
    let mut earliest_start: HashMap<TaskName, u64> = HashMap::with_capacity(order.len());
    let mut critical_dep = HashMap::new();
    let mut total = 0;
    let mut last = None;

    for name in order {
        let Some(task) = tasks.get(name) else {
            continue;
        };

        let mut start = 0;
        let mut via: Option<&TaskName> = None;
        for dep in &task.dependencies {
            let finish = match (earliest_start.get(dep), tasks.get(dep)) {
                (Some(dep_start), Some(dep_task)) => finish_of(dep, *dep_start, dep_task.duration)?,
                _ => continue,
            };
            if via.is_none() || finish > start {
                start = finish;
                via = Some(dep);
            }
        }

        if let Some(dep) = via {
            critical_dep.insert(name.clone(), dep.clone());
        }
        earliest_start.insert(name.clone(), start);

        let finish = finish_of(name, start, task.duration)?;
        if last.is_none() || finish > total {
            total = finish;
            last = Some(name.clone());
        }
    }

    Ok(Estimate {
        total,
        earliest_start,
        critical_dep,
        last,
    })
}

fn finish_of(task: &str, start: u64, duration: u64) -> Result<u64> {
    start
        .checked_add(duration)
        .ok_or_else(|| TaskplanError::DurationOverflow {
            task: task.to_string(),
        })
}
