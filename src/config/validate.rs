// src/config/validate.rs

use crate::config::model::EngineSection;
use crate::errors::{Result, TaskplanError};

/// Basic sanity checks for the `[config]` section.
pub fn validate_engine_section(cfg: &EngineSection) -> Result<()> {
    if cfg.time_unit_ms == Some(0) {
        return Err(TaskplanError::Input(
            "[config].time_unit_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.poll_interval_ms == Some(0) {
        return Err(TaskplanError::Input(
            "[config].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}
