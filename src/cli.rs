// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::engine::ExecutionOptions;
use crate::types::WakeupMode;

/// Command-line arguments for `taskplan`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskplan",
    version,
    about = "Schedule and run tasks in parallel according to dependencies.",
    long_about = None
)]
pub struct CliArgs {
    /// Task file: delimited text (name, duration, dependencies) or `.toml`.
    #[arg(value_name = "TASK_FILE")]
    pub task_file: PathBuf,

    /// Validate the task list and show the expected runtime without running tasks.
    #[arg(long)]
    pub validate: bool,

    /// Run the tasks and show actual vs expected runtime.
    #[arg(long)]
    pub run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKPLAN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Milliseconds per duration unit (default: 1000).
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub time_unit_ms: Option<u64>,

    /// How finished tasks are detected.
    #[arg(long, value_enum, value_name = "MODE")]
    pub wakeup: Option<WakeupArg>,

    /// Liveness check interval in `poll` mode (default: 10).
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: Option<u64>,

    /// Cancel the run if it takes longer than this.
    #[arg(long, value_name = "MS")]
    pub deadline_ms: Option<u64>,
}

impl CliArgs {
    /// Overlay the execution flags given on the command line onto `options`.
    pub fn apply_to(&self, options: &mut ExecutionOptions) {
        if let Some(ms) = self.time_unit_ms {
            options.time_unit = Duration::from_millis(ms);
        }
        if let Some(wakeup) = self.wakeup {
            options.wakeup = wakeup.into();
        }
        if let Some(ms) = self.poll_interval_ms {
            options.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.deadline_ms {
            options.deadline = Some(Duration::from_millis(ms));
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Wake-up mode as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum WakeupArg {
    Signal,
    Poll,
}

impl From<WakeupArg> for WakeupMode {
    fn from(arg: WakeupArg) -> Self {
        match arg {
            WakeupArg::Signal => WakeupMode::Signal,
            WakeupArg::Poll => WakeupMode::Poll,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_options() {
        let args = CliArgs::try_parse_from([
            "taskplan",
            "tasks.csv",
            "--run",
            "--time-unit-ms",
            "50",
            "--wakeup",
            "poll",
            "--deadline-ms",
            "900",
        ])
        .unwrap();
        assert!(args.run);
        assert!(!args.validate);

        let mut options = ExecutionOptions::default();
        args.apply_to(&mut options);
        assert_eq!(options.time_unit, Duration::from_millis(50));
        assert_eq!(options.wakeup, WakeupMode::Poll);
        assert_eq!(options.poll_interval, ExecutionOptions::default().poll_interval);
        assert_eq!(options.deadline, Some(Duration::from_millis(900)));
    }

    #[test]
    fn zero_time_unit_is_rejected() {
        assert!(CliArgs::try_parse_from(["taskplan", "t.csv", "--time-unit-ms", "0"]).is_err());
    }
}
