// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod types;

use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_task_file;
use crate::dag::Scheduler;
use crate::engine::{ExecutionOptions, RuntimeEvent};
use crate::errors::TaskplanError;
use crate::exec::CommandWork;
use crate::report::{format_plan, format_results};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - task file loading
/// - validation and the runtime estimate
/// - (with `--run`) the executor, the runtime and Ctrl-C handling
/// - report printing
pub async fn run(args: CliArgs) -> Result<()> {
    let loaded = load_task_file(&args.task_file)?;
    if loaded.tasks.is_empty() {
        return Err(TaskplanError::NoTasks.into());
    }

    let mut options = ExecutionOptions::default();
    loaded.engine.apply_to(&mut options);
    args.apply_to(&mut options);
    debug!(?options, "execution options");

    let mut scheduler = Scheduler::from_tasks(loaded.tasks);
    scheduler.validate()?;
    scheduler.calculate_expected_runtime()?;

    if args.validate {
        print!("{}", format_plan(&scheduler, options.time_unit));
        return Ok(());
    }

    if !args.run {
        print!("{}", format_plan(&scheduler, options.time_unit));
        println!("Use --run to execute tasks or --validate to just validate");
        return Ok(());
    }

    println!("Running tasks...");
    print!("{}", format_plan(&scheduler, options.time_unit));
    println!("Starting execution...");

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Ctrl-C → cancel running tasks and stop.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            request_shutdown(&tx).await;
        });
    }

    let work = Arc::new(CommandWork::new(options.time_unit));
    let report = scheduler
        .run_tasks_with_events(&options, work, rt_tx, rt_rx)
        .await?;

    print!("{}", format_results(&scheduler, &report, options.time_unit));

    if report.interrupted {
        bail!("run interrupted");
    }
    let failed = report.failed();
    if !failed.is_empty() {
        bail!(
            "{} task(s) failed: {}; blocked: {}",
            failed.len(),
            failed.join(", "),
            report.blocked().len()
        );
    }

    info!("all tasks completed");
    Ok(())
}

/// Ask the runtime to stop. Returns `false` if it has already exited.
async fn request_shutdown(tx: &mpsc::Sender<RuntimeEvent>) -> bool {
    let delivered = tx.send(RuntimeEvent::ShutdownRequested).await.is_ok();
    if !delivered {
        debug!("runtime gone; dropping shutdown request");
    }
    delivered
}
