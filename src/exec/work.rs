// src/exec/work.rs

//! Task bodies.
//!
//! The executor never knows what a task actually does: it calls
//! [`WorkUnit::run`] and waits for the outcome. [`SleepWork`] stands in for
//! "do the declared amount of work"; [`CommandWork`] runs a shell command for
//! tasks that carry one.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::dag::ScheduledTask;
use crate::engine::TaskOutcome;
use crate::types::units_to_duration;

pub type WorkFuture<'a> = Pin<Box<dyn Future<Output = TaskOutcome> + Send + 'a>>;

/// Capability interface for the body of a task.
pub trait WorkUnit: Send + Sync {
    /// Do the work for `task`. Dropping the returned future must stop it.
    fn run<'a>(&'a self, task: &'a ScheduledTask) -> WorkFuture<'a>;
}

/// Sleeps for the task's declared duration and always succeeds.
#[derive(Debug, Clone, Copy)]
pub struct SleepWork {
    unit: Duration,
}

impl SleepWork {
    /// `unit` is the wall-clock length of one duration unit.
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }
}

impl WorkUnit for SleepWork {
    fn run<'a>(&'a self, task: &'a ScheduledTask) -> WorkFuture<'a> {
        let wait = units_to_duration(task.duration, self.unit);
        Box::pin(async move {
            tokio::time::sleep(wait).await;
            TaskOutcome::Success
        })
    }
}

/// Runs the task's `cmd` through the platform shell; tasks without a command
/// fall back to [`SleepWork`].
///
/// Exit status 0 is success; anything else (including a failure to spawn) is
/// `TaskOutcome::Failed` with the exit code, or -1 without one.
#[derive(Debug, Clone, Copy)]
pub struct CommandWork {
    fallback: SleepWork,
}

impl CommandWork {
    pub fn new(unit: Duration) -> Self {
        Self {
            fallback: SleepWork::new(unit),
        }
    }
}

impl WorkUnit for CommandWork {
    fn run<'a>(&'a self, task: &'a ScheduledTask) -> WorkFuture<'a> {
        match task.cmd.as_deref() {
            Some(cmd) => Box::pin(async move {
                match run_command(&task.name, cmd).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        error!(task = %task.name, error = %err, "task command error");
                        TaskOutcome::Failed(-1)
                    }
                }
            }),
            None => self.fallback.run(task),
        }
    }
}

async fn run_command(name: &str, cmd: &str) -> anyhow::Result<TaskOutcome> {
    info!(task = %name, cmd = %cmd, "starting task process");

    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{name}'"))?;

    // Always consume the pipes so buffers don't fill.
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(log_lines(name.to_string(), "stdout", stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(log_lines(name.to_string(), "stderr", stderr));
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{name}'"))?;

    let code = status.code().unwrap_or(-1);
    info!(
        task = %name,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    Ok(if status.success() {
        TaskOutcome::Success
    } else {
        TaskOutcome::Failed(code)
    })
}

async fn log_lines<R>(task: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(task = %task, stream, "{}", line);
    }
}
