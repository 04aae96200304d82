// src/config/mod.rs

//! Task file loading.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Parse delimited text task files (`delimited.rs`).
//! - Load a task file from disk, choosing the format (`loader.rs`).
//! - Validate the `[config]` section (`validate.rs`).

pub mod delimited;
pub mod loader;
pub mod model;
pub mod validate;

pub use delimited::parse_delimited;
pub use loader::{load_task_file, parse_toml};
pub use model::{EngineSection, InputWarning, LoadedTasks, RawTaskFile, TaskEntry};
pub use validate::validate_engine_section;
