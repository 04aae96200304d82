// tests/property_scheduler.rs

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use taskplan::dag::{Scheduler, Task};

// Strategy to generate an acyclic task set.
// Acyclicity comes from only letting task N depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Task>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let deps_strat = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        );
        let durations_strat = proptest::collection::vec(0u64..20, num_tasks);

        (deps_strat, durations_strat).prop_map(move |(raw_deps, durations)| {
            raw_deps
                .into_iter()
                .zip(durations)
                .enumerate()
                .map(|(i, (potential_deps, duration))| {
                    let mut deps: Vec<String> = Vec::new();
                    let mut seen = HashSet::new();
                    for dep_idx in potential_deps {
                        if i > 0 && seen.insert(dep_idx % i) {
                            deps.push(format!("task_{}", dep_idx % i));
                        }
                    }
                    Task::new(format!("task_{i}"), duration, deps)
                })
                .collect()
        })
    })
}

/// Longest path by brute force over all chains: for each task, its duration
/// plus the largest finish time among its dependencies.
fn reference_makespan(tasks: &[Task]) -> u64 {
    let by_name: HashMap<&str, &Task> = tasks.iter().map(|t| (t.name.as_str(), t)).collect();

    fn finish<'a>(
        name: &'a str,
        by_name: &HashMap<&'a str, &'a Task>,
        memo: &mut HashMap<&'a str, u64>,
    ) -> u64 {
        if let Some(v) = memo.get(name) {
            return *v;
        }
        let task = by_name[name];
        let start = task
            .dependencies
            .iter()
            .map(|d| finish(d.as_str(), by_name, memo))
            .max()
            .unwrap_or(0);
        let v = start + task.duration;
        memo.insert(name, v);
        v
    }

    let mut memo = HashMap::new();
    tasks
        .iter()
        .map(|t| finish(t.name.as_str(), &by_name, &mut memo))
        .max()
        .unwrap_or(0)
}

proptest! {
    #[test]
    fn order_is_a_valid_permutation(tasks in dag_strategy(12)) {
        let mut scheduler = Scheduler::from_tasks(tasks.clone());
        let order = scheduler.validate().unwrap().to_vec();

        prop_assert_eq!(order.len(), tasks.len());
        let unique: HashSet<&String> = order.iter().collect();
        prop_assert_eq!(unique.len(), tasks.len());

        let pos: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();
        for task in &tasks {
            for dep in &task.dependencies {
                prop_assert!(pos[dep.as_str()] < pos[task.name.as_str()]);
            }
        }
    }

    #[test]
    fn estimate_matches_longest_path(tasks in dag_strategy(12)) {
        let mut scheduler = Scheduler::from_tasks(tasks.clone());
        let expected = scheduler.calculate_expected_runtime().unwrap();
        prop_assert_eq!(expected, reference_makespan(&tasks));

        let path = scheduler.estimate().unwrap().critical_path();
        let on_path: u64 = path
            .iter()
            .map(|n| scheduler.task(n).unwrap().duration)
            .sum();
        prop_assert_eq!(on_path, expected);
    }

    #[test]
    fn estimate_ignores_registration_order(tasks in dag_strategy(10)) {
        let mut forward = Scheduler::from_tasks(tasks.clone());
        let mut reversed = Scheduler::from_tasks(tasks.into_iter().rev());
        prop_assert_eq!(
            forward.calculate_expected_runtime().unwrap(),
            reversed.calculate_expected_runtime().unwrap()
        );
    }

    #[test]
    fn longer_durations_never_shrink_the_estimate(
        tasks in dag_strategy(10),
        pick in any::<usize>(),
        extra in 1u64..10,
    ) {
        let mut base = Scheduler::from_tasks(tasks.clone());
        let before = base.calculate_expected_runtime().unwrap();

        let mut grown = tasks;
        let idx = pick % grown.len();
        grown[idx].duration += extra;
        let mut after = Scheduler::from_tasks(grown);

        prop_assert!(after.calculate_expected_runtime().unwrap() >= before);
    }
}
