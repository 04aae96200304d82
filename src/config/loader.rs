// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::delimited::parse_delimited;
use crate::config::model::{InputWarning, LoadedTasks, RawTaskFile, TaskEntry};
use crate::config::validate::validate_engine_section;
use crate::errors::Result;

/// Load a task file, picking the format from the extension: `.toml` files
/// are read as TOML, anything else as delimited text.
///
/// Malformed task entries are skipped and reported in
/// [`LoadedTasks::warnings`] (and logged); they never make loading fail.
/// Graph validation (unknown dependencies, cycles) is not done here.
pub fn load_task_file(path: impl AsRef<Path>) -> Result<LoadedTasks> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let loaded = if is_toml {
        parse_toml(&contents)?
    } else {
        parse_delimited(&contents)
    };

    for warning in &loaded.warnings {
        warn!(path = %path.display(), "{warning}");
    }
    debug!(
        path = %path.display(),
        tasks = loaded.tasks.len(),
        skipped = loaded.warnings.len(),
        "task file loaded"
    );

    Ok(loaded)
}

/// Parse a TOML task file.
///
/// Fails only when the document itself is not valid TOML or the `[config]`
/// section is invalid; individual bad `[task.<name>]` tables become
/// warnings.
pub fn parse_toml(contents: &str) -> Result<LoadedTasks> {
    let raw: RawTaskFile = toml::from_str(contents)?;
    validate_engine_section(&raw.config)?;

    let mut loaded = LoadedTasks {
        engine: raw.config,
        ..LoadedTasks::default()
    };

    for (name, value) in raw.task {
        match value.try_into::<TaskEntry>() {
            Ok(entry) => loaded.tasks.push(entry.into_task(&name)),
            Err(err) => loaded.warnings.push(InputWarning::InvalidTask {
                name,
                reason: err.message().to_string(),
            }),
        }
    }

    Ok(loaded)
}
