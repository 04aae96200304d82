// src/exec/mod.rs

//! Task execution layer.
//!
//! This module runs the bodies of scheduled tasks and reports back to the
//! runtime via `RuntimeEvent`s.
//!
//! - [`work`] defines the [`WorkUnit`] capability and its implementations.
//! - [`executor_loop`] owns the loop that starts, cancels and (in poll
//!   mode) checks on running units.
//! - [`task_runner`] runs one unit with cancellation.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `RealExecutorBackend` the runtime uses in production, which tests can
//!   replace with a fake implementation.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;
pub mod work;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
pub use work::{CommandWork, SleepWork, WorkUnit};
