// src/logging.rs

//! Diagnostics on stderr via `tracing-subscriber`.
//!
//! stdout belongs to the plan and result reports, so nothing is logged there.
//! The filter comes from, in order:
//! 1. `--log-level`, applied to `taskplan` itself (dependencies stay at `warn`)
//! 2. `TASKPLAN_LOG`, any `EnvFilter` directive list such as
//!    `taskplan::engine=debug,taskplan::exec=trace`
//! 3. `warn`

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "TASKPLAN_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let directives = match (cli_level, env) {
        (Some(level), _) => crate_directives(level),
        (None, Some(env)) if !env.trim().is_empty() => env.trim().to_string(),
        _ => DEFAULT_DIRECTIVES.to_string(),
    };

    EnvFilter::try_new(&directives).with_context(|| format!("invalid log filter '{directives}'"))
}

fn crate_directives(level: LogLevel) -> String {
    let level = match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };
    format!("{DEFAULT_DIRECTIVES},{}={level}", env!("CARGO_CRATE_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_is_scoped_to_the_crate() {
        assert_eq!(crate_directives(LogLevel::Debug), "warn,taskplan=debug");
        let filter = build_filter(Some(LogLevel::Trace), Some("error")).unwrap();
        assert!(filter.to_string().contains("taskplan=trace"));
    }

    #[test]
    fn env_directives_and_default() {
        let filter = build_filter(None, Some("taskplan::engine=debug")).unwrap();
        assert!(filter.to_string().contains("taskplan::engine=debug"));

        let filter = build_filter(None, Some("  ")).unwrap();
        assert!(filter.to_string().contains("warn"));

        assert!(build_filter(None, Some("taskplan=loud")).is_err());
    }
}
