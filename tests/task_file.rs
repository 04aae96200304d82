// tests/task_file.rs

use std::error::Error;
use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use taskplan::config::{InputWarning, load_task_file};
use taskplan::dag::Scheduler;
use taskplan::engine::ExecutionOptions;
use taskplan::errors::TaskplanError;
use taskplan::types::WakeupMode;

type TestResult = Result<(), Box<dyn Error>>;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn delimited_file_loads_in_file_order() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "tasks.csv",
        "# name,duration,dependencies\nA,2\nB,3,A\nC,1,A\nD,2,\"B,C\"\n",
    );

    let loaded = load_task_file(&path)?;
    assert!(loaded.warnings.is_empty());

    let names: Vec<&str> = loaded.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C", "D"]);

    let mut scheduler = Scheduler::from_tasks(loaded.tasks);
    assert_eq!(scheduler.calculate_expected_runtime()?, 7);
    Ok(())
}

#[test]
fn malformed_rows_become_warnings() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(&dir, "tasks.txt", "A,2\nlonely\nB,soon,A\n\nC,1,A\n");

    let loaded = load_task_file(&path)?;
    let names: Vec<&str> = loaded.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["A", "C"]);

    assert_eq!(loaded.warnings.len(), 2);
    assert!(matches!(loaded.warnings[0], InputWarning::InvalidRow { row: 2, .. }));
    assert_eq!(
        loaded.warnings[1],
        InputWarning::InvalidDuration {
            row: 3,
            value: "soon".to_string(),
        }
    );
    Ok(())
}

#[test]
fn toml_file_carries_tasks_and_settings() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "tasks.toml",
        r#"
[config]
time_unit_ms = 50
wakeup = "poll"
deadline_ms = 2000

[task.fetch]
duration = 2

[task.build]
duration = 3
after = ["fetch"]
cmd = "make"

[task.broken]
duration = "long"

[task.test]
duration = 1
after = ["build"]
"#,
    );

    let loaded = load_task_file(&path)?;

    let names: Vec<&str> = loaded.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["fetch", "build", "test"]);
    assert_eq!(loaded.tasks[1].cmd.as_deref(), Some("make"));
    assert_eq!(loaded.tasks[2].dependencies, ["build"]);

    assert_eq!(loaded.warnings.len(), 1);
    assert!(matches!(
        &loaded.warnings[0],
        InputWarning::InvalidTask { name, .. } if name == "broken"
    ));

    let mut options = ExecutionOptions::default();
    loaded.engine.apply_to(&mut options);
    assert_eq!(options.time_unit, Duration::from_millis(50));
    assert_eq!(options.wakeup, WakeupMode::Poll);
    assert_eq!(options.deadline, Some(Duration::from_millis(2000)));
    Ok(())
}

#[test]
fn toml_with_unknown_config_key_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let path = write(&dir, "tasks.toml", "[config]\nthreads = 4\n");

    let err = load_task_file(&path).unwrap_err();
    assert!(matches!(err, TaskplanError::TomlError(_)));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_task_file(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, TaskplanError::IoError(_)));
}
