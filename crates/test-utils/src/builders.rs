#![allow(dead_code)]

use indexmap::IndexMap;
use taskplan::dag::{Scheduler, Task, TaskMap};

/// Builder for a task set, keeping registration order.
pub struct TaskSetBuilder {
    tasks: Vec<Task>,
}

impl TaskSetBuilder {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Shorthand for a task with a duration and dependencies.
    pub fn task(self, name: &str, duration: u64, deps: &[&str]) -> Self {
        self.with_task(TaskBuilder::new(name, duration).after_all(deps).build())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn build_map(self) -> TaskMap {
        let mut map = IndexMap::new();
        for task in self.tasks {
            map.insert(task.name.clone(), task);
        }
        map
    }

    pub fn build(self) -> Scheduler {
        Scheduler::from_tasks(self.tasks)
    }
}

impl Default for TaskSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The four-task diamond used throughout the tests:
/// `A(2)`, `B(3) after A`, `C(1) after A`, `D(2) after B, C`.
pub fn diamond() -> TaskSetBuilder {
    TaskSetBuilder::new()
        .task("A", 2, &[])
        .task("B", 3, &["A"])
        .task("C", 1, &["A"])
        .task("D", 2, &["B", "C"])
}

/// Builder for a single `Task`.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(name: &str, duration: u64) -> Self {
        Self {
            task: Task::new(name, duration, Vec::<String>::new()),
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.dependencies.push(dep.to_string());
        self
    }

    pub fn after_all(mut self, deps: &[&str]) -> Self {
        self.task
            .dependencies
            .extend(deps.iter().map(|d| d.to_string()));
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(cmd.to_string());
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}
