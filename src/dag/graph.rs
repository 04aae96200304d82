// src/dag/graph.rs

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::task_info::Task;
use crate::engine::TaskName;
use crate::errors::GraphError;

/// Insertion-ordered task registry.
pub type TaskMap = IndexMap<TaskName, Task>;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct dependencies, declared order, duplicates removed.
    deps: Vec<TaskName>,
    /// Direct dependents, in registry order.
    dependents: Vec<TaskName>,
}

/// In-memory dependency graph keyed by task name.
///
/// Edges point from a dependency to its dependents. Node iteration follows
/// the registry order of the task map the graph was built from; this is the
/// tie-break used everywhere a choice between equally ready tasks is made.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: IndexMap<TaskName, DagNode>,
}

impl DagGraph {
    /// Build the adjacency structure for a task map.
    ///
    /// Dependencies naming unknown tasks are kept on the node (so they can be
    /// reported by [`DagGraph::missing_dependencies`]) but produce no edge.
    pub fn from_tasks(tasks: &TaskMap) -> Self {
        let mut nodes: IndexMap<TaskName, DagNode> = IndexMap::with_capacity(tasks.len());

        for (name, task) in tasks.iter() {
            let mut seen = HashSet::new();
            let deps = task
                .dependencies
                .iter()
                .filter(|dep| seen.insert(dep.as_str()))
                .cloned()
                .collect();
            nodes.insert(
                name.clone(),
                DagNode {
                    deps,
                    dependents: Vec::new(),
                },
            );
        }

        for i in 0..nodes.len() {
            let (task_name, node) = match nodes.get_index(i) {
                Some((name, node)) => (name.clone(), node.deps.clone()),
                None => continue,
            };
            for dep in node {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(task_name.clone());
                }
            }
        }

        Self { nodes }
    }

    /// Return all task names in registry order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list this one as a dependency).
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Every dependency reference that names an unknown task, one entry per
    /// `(task, dependency)` pair.
    pub fn missing_dependencies(&self) -> Vec<GraphError> {
        self.nodes
            .iter()
            .flat_map(|(name, node)| {
                node.deps
                    .iter()
                    .filter(|dep| !self.nodes.contains_key(*dep))
                    .map(|dep| GraphError::MissingDependency {
                        task: name.clone(),
                        dependency: dep.clone(),
                    })
            })
            .collect()
    }

    /// Kahn's algorithm over the known edges.
    ///
    /// Ready tasks are taken FIFO; the queue is seeded in registry order and
    /// dependents are enqueued in registry order, so the result is
    /// deterministic for a given registry.
    pub fn topological_order(&self) -> Result<Vec<TaskName>, GraphError> {
        let mut in_degree: IndexMap<&str, usize> = self
            .nodes
            .iter()
            .map(|(name, node)| {
                let known = node
                    .deps
                    .iter()
                    .filter(|dep| self.nodes.contains_key(*dep))
                    .count();
                (name.as_str(), known)
            })
            .collect();

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(current) = queue.pop_front() {
            order.push(current.to_string());

            for dependent in self.dependents_of(current) {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let placed: HashSet<&str> = order.iter().map(|s| s.as_str()).collect();
            let unordered: Vec<TaskName> = self
                .tasks()
                .filter(|name| !placed.contains(name))
                .map(|s| s.to_string())
                .collect();
            let cycle = self.cycle_members(&unordered);
            debug!(?cycle, ?unordered, "topological sort left tasks unordered");
            return Err(GraphError::Cycle { cycle, unordered });
        }

        Ok(order)
    }

    /// Missing-dependency check, then sort.
    ///
    /// All missing references are reported together; the sort only runs when
    /// every reference resolves.
    pub fn validate(&self) -> Result<Vec<TaskName>, Vec<GraphError>> {
        let missing = self.missing_dependencies();
        if !missing.is_empty() {
            return Err(missing);
        }
        self.topological_order().map_err(|e| vec![e])
    }

    /// Tasks among `unordered` that lie on a cycle (non-trivial strongly
    /// connected components, or self-loops), in registry order.
    fn cycle_members(&self, unordered: &[TaskName]) -> Vec<TaskName> {
        let remaining: HashSet<&str> = unordered.iter().map(|s| s.as_str()).collect();
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in unordered {
            graph.add_node(name.as_str());
        }
        for name in unordered {
            for dep in self.dependencies_of(name) {
                if remaining.contains(dep.as_str()) {
                    graph.add_edge(dep.as_str(), name.as_str(), ());
                }
            }
        }

        let on_cycle: HashSet<&str> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || graph.contains_edge(component[0], component[0])
            })
            .flatten()
            .collect();

        unordered
            .iter()
            .filter(|name| on_cycle.contains(name.as_str()))
            .cloned()
            .collect()
    }
}
