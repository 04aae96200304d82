// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use taskplan::dag::TaskState;
use taskplan::engine::{CoreRuntime, ExecutionOptions, Runtime, RuntimeEvent};
use taskplan_test_utils::builders::{TaskSetBuilder, diamond};
use taskplan_test_utils::fake_executor::FakeExecutor;
use taskplan_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn diamond_runs_every_task_after_its_dependencies() -> TestResult {
    init_tracing();

    let mut scheduler = diamond().build();
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx, Arc::clone(&executed));

    let report = with_timeout(scheduler.run_with_executor(
        executor,
        rt_rx,
        &ExecutionOptions::default(),
    ))
    .await?;

    assert!(report.succeeded());
    let executed = executed.lock().unwrap().clone();
    assert_eq!(executed, vec!["A", "B", "C", "D"]);

    // Observations are copied back into the registry.
    for name in ["A", "B", "C", "D"] {
        assert!(scheduler.task(name).unwrap().actual_duration.is_some());
    }
    assert!(scheduler.actual_runtime().is_some());

    Ok(())
}

#[tokio::test]
async fn failed_task_blocks_its_dependents_only() -> TestResult {
    init_tracing();

    let mut scheduler = TaskSetBuilder::new()
        .task("A", 1, &[])
        .task("B", 1, &["A"])
        .task("C", 1, &["B"])
        .task("D", 1, &["A"])
        .build();
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx, Arc::clone(&executed)).failing("B");

    let report = with_timeout(scheduler.run_with_executor(
        executor,
        rt_rx,
        &ExecutionOptions::default(),
    ))
    .await?;

    assert!(!report.succeeded());
    assert!(!report.interrupted);
    assert_eq!(report.failed(), vec!["B"]);
    assert_eq!(report.blocked(), vec!["C"]);
    assert_eq!(report.state_of("D"), Some(TaskState::Completed));

    let executed = executed.lock().unwrap().clone();
    assert!(!executed.contains(&"C".to_string()));

    Ok(())
}

#[tokio::test]
async fn shutdown_cancels_running_tasks() -> TestResult {
    init_tracing();

    let mut scheduler = TaskSetBuilder::new()
        .task("A", 1, &[])
        .task("B", 1, &["A"])
        .build();
    let run = scheduler.start_run()?;

    // An executor that never reports back, so A stays running until the
    // shutdown arrives.
    let (silent_tx, _silent_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(silent_tx, Arc::clone(&executed));
    let cancelled = executor.cancelled();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    let runtime = Runtime::new(CoreRuntime::new(run), rt_rx, executor, None);
    let report = with_timeout(runtime.run()).await?;

    assert!(report.interrupted);
    assert_eq!(report.state_of("A"), Some(TaskState::Cancelled));
    assert_eq!(report.state_of("B"), Some(TaskState::Pending));
    assert_eq!(cancelled.lock().unwrap().clone(), vec!["A"]);
    assert_eq!(executed.lock().unwrap().clone(), vec!["A"]);

    Ok(())
}

#[tokio::test]
async fn closed_event_channel_is_an_error() -> TestResult {
    init_tracing();

    let mut scheduler = TaskSetBuilder::new().task("A", 1, &[]).build();
    let run = scheduler.start_run()?;

    let (silent_tx, _silent_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executor = FakeExecutor::new(silent_tx, Arc::new(Mutex::new(Vec::new())));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    drop(rt_tx);

    let runtime = Runtime::new(CoreRuntime::new(run), rt_rx, executor, None);
    let result = with_timeout(runtime.run()).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn fan_out_wider_than_the_event_channel_completes() -> TestResult {
    init_tracing();

    // Every root finishes at once, and each one releases a dependent, so the
    // runtime has far more completions and dispatches in flight than its
    // channels hold.
    let mut builder = TaskSetBuilder::new();
    for i in 0..150 {
        builder = builder.task(&format!("root{i}"), 1, &[]);
    }
    for i in 0..150 {
        let root = format!("root{i}");
        builder = builder.task(&format!("leaf{i}"), 1, &[root.as_str()]);
    }
    let mut scheduler = builder.task("join", 1, &["leaf0", "leaf149"]).build();

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx, Arc::clone(&executed));

    let report = with_timeout(scheduler.run_with_executor(
        executor,
        rt_rx,
        &ExecutionOptions::default(),
    ))
    .await?;

    assert!(report.succeeded());
    let executed = executed.lock().unwrap().clone();
    assert_eq!(executed.len(), 301);
    // All roots go out in the first dispatch, in registration order.
    assert_eq!(executed[0], "root0");
    assert_eq!(executed[149], "root149");
    assert_eq!(executed.last().map(String::as_str), Some("join"));

    Ok(())
}
