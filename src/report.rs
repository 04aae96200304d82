// src/report.rs

//! Human-readable plan and result reports.
//!
//! Durations are printed in task duration units. With the default unit of
//! one second the label is "seconds"/"s"; any other unit is labelled
//! "units"/"u".

use std::fmt::Write;
use std::time::Duration;

use crate::dag::{ExecutionReport, Scheduler, TaskState};
use crate::types::{DEFAULT_TIME_UNIT, duration_to_units};

fn unit_labels(unit: Duration) -> (&'static str, &'static str) {
    if unit == DEFAULT_TIME_UNIT {
        ("seconds", "s")
    } else {
        ("units", "u")
    }
}

/// Expected total runtime and the numbered execution order.
///
/// Prints nothing but a header if the scheduler has not been validated.
pub fn format_plan(scheduler: &Scheduler, unit: Duration) -> String {
    let (long, short) = unit_labels(unit);
    let mut out = String::new();

    let expected = scheduler
        .expected_runtime()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let _ = writeln!(out, "Expected total runtime: {expected} {long}");
    let _ = writeln!(out, "Execution order:");

    for (i, name) in scheduler.execution_order().unwrap_or_default().iter().enumerate() {
        let Some(task) = scheduler.task(name) else {
            continue;
        };
        let deps = if task.dependencies.is_empty() {
            "none".to_string()
        } else {
            task.dependencies.join(", ")
        };
        let _ = writeln!(
            out,
            "{}. {} (duration: {}{short}, dependencies: {deps})",
            i + 1,
            name,
            task.duration
        );
    }

    out
}

/// Expected vs actual runtime, globally and per task.
pub fn format_results(scheduler: &Scheduler, report: &ExecutionReport, unit: Duration) -> String {
    let (long, short) = unit_labels(unit);
    let mut out = String::new();

    let expected = scheduler.expected_runtime().unwrap_or_default() as f64;
    let actual = duration_to_units(report.actual_runtime, unit);

    let _ = writeln!(out, "Execution Results:");
    let _ = writeln!(out, "Expected runtime: {expected:.2} {long}");
    let _ = writeln!(out, "Actual runtime: {actual:.2} {long}");
    let _ = writeln!(out, "Difference: {:.2} {long}", actual - expected);

    let _ = writeln!(out, "Task execution details:");
    for name in &report.order {
        let Some(task) = report.tasks.get(name) else {
            continue;
        };
        match (task.actual_duration, report.state_of(name)) {
            (Some(actual), Some(state)) => {
                let actual = duration_to_units(actual, unit);
                let diff = actual - task.duration as f64;
                let suffix = if state == TaskState::Failed {
                    " (failed)"
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    "{name}: expected {}{short}, actual {actual:.2}{short}, diff {diff:.2}{short}{suffix}",
                    task.duration
                );
            }
            (None, Some(TaskState::Blocked)) => {
                let _ = writeln!(out, "{name}: blocked by a failed dependency");
            }
            (None, Some(TaskState::Cancelled)) => {
                let _ = writeln!(out, "{name}: cancelled");
            }
            _ => {}
        }
    }

    if report.interrupted {
        let _ = writeln!(out, "Run interrupted before all tasks finished");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Task;
    use crate::engine::TaskOutcome::Success;

    fn scheduler() -> Scheduler {
        let mut s = Scheduler::from_tasks([
            Task::new("A", 2, Vec::<&str>::new()),
            Task::new("B", 3, ["A"]),
            Task::new("C", 1, ["A"]),
            Task::new("D", 2, ["B", "C"]),
        ]);
        s.calculate_expected_runtime().unwrap();
        s
    }

    #[test]
    fn plan_lists_order_with_dependencies() {
        let plan = format_plan(&scheduler(), DEFAULT_TIME_UNIT);
        assert_eq!(
            plan,
            "Expected total runtime: 7 seconds\n\
             Execution order:\n\
             1. A (duration: 2s, dependencies: none)\n\
             2. B (duration: 3s, dependencies: A)\n\
             3. C (duration: 1s, dependencies: A)\n\
             4. D (duration: 2s, dependencies: B, C)\n"
        );
    }

    #[test]
    fn results_show_per_task_difference() {
        let mut s = scheduler();
        let mut run = s.start_run().unwrap();
        run.handle_start(Duration::ZERO);
        run.handle_completion("A", Success, Duration::from_millis(2_500));
        run.handle_completion("C", Success, Duration::from_millis(3_500));
        run.handle_completion("B", Success, Duration::from_millis(5_500));
        run.handle_completion("D", Success, Duration::from_millis(7_500));
        let report = run.into_report(Duration::from_millis(7_500));

        let text = format_results(&s, &report, DEFAULT_TIME_UNIT);
        assert!(text.contains("Expected runtime: 7.00 seconds"));
        assert!(text.contains("Actual runtime: 7.50 seconds"));
        assert!(text.contains("Difference: 0.50 seconds"));
        assert!(text.contains("A: expected 2s, actual 2.50s, diff 0.50s"));
        assert!(text.contains("D: expected 2s, actual 2.00s, diff 0.00s"));
    }

    #[test]
    fn scaled_units_use_generic_label() {
        let plan = format_plan(&scheduler(), Duration::from_millis(10));
        assert!(plan.starts_with("Expected total runtime: 7 units\n"));
        assert!(plan.contains("(duration: 2u, dependencies: none)"));
    }
}
