// src/dag/mod.rs

//! Task graph model, ordering, estimation and per-run state.
//!
//! - [`task_info`] holds task records and the per-run [`TaskState`].
//! - [`graph`] builds the adjacency structure, reports missing dependencies
//!   and produces the topological order.
//! - [`estimate`] computes the critical-path runtime estimate.
//! - [`scheduler`] is the owner of the registry and its derived state.
//! - [`run`] is the state of a single execution, advanced step by step.
//! - [`state_manager`] implements the per-run state transitions.
//! - [`scheduler_step`] defines the result type for run steps.

pub mod estimate;
pub mod graph;
pub mod run;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use estimate::{Estimate, estimate};
pub use graph::{DagGraph, TaskMap};
pub use run::{DagRun, ExecutionReport};
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, Task, TaskState};
