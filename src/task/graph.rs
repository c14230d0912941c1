//! Dependency graph views over a snapshot of tasks.
//!
//! Edges come from `depends_on`: a task depending on `p` must wait for `p`. All
//! functions are pure; callers pass the full task list they loaded.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::warn;

use crate::error::{Error, Result};
use crate::task::{IdKey, Task, TaskStatus};

type TaskIndex<'a> = HashMap<&'a str, &'a Task>;

fn index_by_id(all: &[Task]) -> TaskIndex<'_> {
    all.iter().map(|t| (t.id.as_str(), t)).collect()
}

// == Executability ==
/// A task is executable when it is `todo` and every prerequisite is `completed`.
///
/// Unknown prerequisite ids count as unsatisfied.
pub fn is_executable(task: &Task, all: &[Task]) -> bool {
    executable_in(task, &index_by_id(all))
}

/// Prerequisite ids of `task` that are missing or not `completed`, in `depends_on` order.
pub fn unmet_dependencies<'a>(task: &'a Task, all: &[Task]) -> Vec<&'a str> {
    let by_id = index_by_id(all);
    task.depends_on
        .iter()
        .map(String::as_str)
        .filter(|dep| !satisfied(dep, &by_id))
        .collect()
}

/// Executable tasks, in input order.
pub fn executable_tasks(all: &[Task]) -> Vec<&Task> {
    let by_id = index_by_id(all);
    all.iter().filter(|task| executable_in(task, &by_id)).collect()
}

fn executable_in(task: &Task, by_id: &TaskIndex<'_>) -> bool {
    task.status == TaskStatus::Todo && task.depends_on.iter().all(|dep| satisfied(dep, by_id))
}

fn satisfied(dep: &str, by_id: &TaskIndex<'_>) -> bool {
    by_id.get(dep).is_some_and(|t| t.status.is_complete())
}

/// Tasks that list `id` in their `depends_on`.
pub fn dependents<'a>(id: &str, all: &'a [Task]) -> Vec<&'a Task> {
    all.iter().filter(|t| t.depends_on(id)).collect()
}

// == Topological Order ==
/// Orders tasks so every prerequisite precedes its dependents (Kahn's algorithm).
///
/// Among tasks that are ready at the same time the smallest id goes first, numeric
/// ids by value. Edges to unknown ids are ignored. If the snapshot is cyclic the
/// stuck tasks are appended in id order, so the result is always a permutation.
pub fn topological_order(all: &[Task]) -> Vec<&Task> {
    let by_id = index_by_id(all);
    let mut indegree: HashMap<&str, usize> = HashMap::with_capacity(all.len());
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();

    for task in all {
        let deps: HashSet<&str> = task
            .depends_on
            .iter()
            .map(String::as_str)
            .filter(|d| by_id.contains_key(d))
            .collect();
        indegree.insert(task.id.as_str(), deps.len());
        for dep in deps {
            children.entry(dep).or_default().push(task.id.as_str());
        }
    }

    let mut ready: BinaryHeap<Reverse<IdKey>> = indegree
        .iter()
        .filter(|(_, n)| **n == 0)
        .map(|(&id, _)| Reverse(IdKey::new(id)))
        .collect();

    let mut order = Vec::with_capacity(all.len());
    let mut placed: HashSet<&str> = HashSet::with_capacity(all.len());

    while let Some(Reverse(key)) = ready.pop() {
        let id = key.as_str();
        if !placed.insert(id) {
            continue;
        }
        if let Some(task) = by_id.get(id) {
            order.push(*task);
        }
        for child in children.get(id).into_iter().flatten() {
            if let Some(n) = indegree.get_mut(child) {
                *n -= 1;
                if *n == 0 {
                    ready.push(Reverse(IdKey::new(*child)));
                }
            }
        }
    }

    if order.len() < by_id.len() {
        let mut stuck: Vec<&Task> = by_id
            .values()
            .copied()
            .filter(|t| !placed.contains(t.id.as_str()))
            .collect();
        stuck.sort_by(|a, b| IdKey::new(&a.id).cmp(&IdKey::new(&b.id)));
        warn!(count = stuck.len(), "task graph contains a cycle; appending unordered tasks");
        order.extend(stuck);
    }

    order
}

// == Cycle Check ==
/// Rejects `candidate` if following `depends_on` from it leads back to it.
///
/// `candidate` replaces any task with the same id in `all`, so this can run on a
/// pending create or update before anything is written. The error carries the
/// cycle as `[candidate, .., candidate]`.
pub fn validate_no_cycle(candidate: &Task, all: &[Task]) -> Result<()> {
    let mut edges: HashMap<&str, &[String]> = all
        .iter()
        .map(|t| (t.id.as_str(), t.depends_on.as_slice()))
        .collect();
    edges.insert(candidate.id.as_str(), candidate.depends_on.as_slice());

    let start = candidate.id.as_str();
    let mut visited: HashSet<&str> = HashSet::new();
    // (node, index of next dependency to explore)
    let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
    visited.insert(start);

    while let Some((node, next)) = stack.last_mut() {
        let deps = edges.get(*node).copied().unwrap_or(&[]);
        let Some(dep) = deps.get(*next) else {
            stack.pop();
            continue;
        };
        *next += 1;
        let dep = dep.as_str();

        if dep == start {
            let mut path: Vec<String> = stack.iter().map(|(id, _)| id.to_string()).collect();
            path.push(start.to_string());
            warn!(path = ?path, "rejected dependency cycle");
            return Err(Error::Cycle { path });
        }
        if visited.insert(dep) {
            stack.push((dep, 0));
        }
    }

    Ok(())
}
