//! Property-Based Tests for the dependency graph
//!
//! Graphs are grown edge by edge through `validate_no_cycle`, mirroring how writes
//! reach the store.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::task::{executable_tasks, is_executable, topological_order, validate_no_cycle};
use crate::task::{Task, TaskStatus};

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Todo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
        Just(TaskStatus::Cancelled),
    ]
}

/// Builds tasks `0..n` and adds each proposed edge only if the cycle check accepts it.
fn grow_graph(statuses: &[TaskStatus], edges: &[(usize, usize)]) -> Vec<Task> {
    let n = statuses.len();
    let mut tasks: Vec<Task> = statuses
        .iter()
        .enumerate()
        .map(|(i, s)| Task::new(i.to_string(), format!("t{}", i)).with_status(*s))
        .collect();

    for &(child, parent) in edges {
        let (child, parent) = (child % n, parent % n);
        let parent_id = tasks[parent].id.clone();
        if tasks[child].depends_on(&parent_id) {
            continue;
        }
        let mut candidate = tasks[child].clone();
        candidate.depends_on.push(parent_id);
        if validate_no_cycle(&candidate, &tasks).is_ok() {
            tasks[child] = candidate;
        }
    }
    tasks
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_topological_order_is_valid_permutation(
        statuses in prop::collection::vec(status_strategy(), 1..25),
        edges in prop::collection::vec((0usize..25, 0usize..25), 0..60)
    ) {
        let tasks = grow_graph(&statuses, &edges);
        let order = topological_order(&tasks);

        prop_assert_eq!(order.len(), tasks.len());
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();
        prop_assert_eq!(position.len(), tasks.len(), "duplicate task in order");

        for task in &tasks {
            for dep in &task.depends_on {
                prop_assert!(
                    position[dep.as_str()] < position[task.id.as_str()],
                    "{} placed before its prerequisite {}",
                    task.id,
                    dep
                );
            }
        }
    }

    #[test]
    fn prop_accepted_graphs_stay_acyclic(
        statuses in prop::collection::vec(status_strategy(), 1..20),
        edges in prop::collection::vec((0usize..20, 0usize..20), 0..50)
    ) {
        let tasks = grow_graph(&statuses, &edges);

        for task in &tasks {
            prop_assert!(validate_no_cycle(task, &tasks).is_ok());
            prop_assert!(!task.depends_on(&task.id));
        }
    }

    #[test]
    fn prop_executable_matches_definition(
        statuses in prop::collection::vec(status_strategy(), 1..20),
        edges in prop::collection::vec((0usize..20, 0usize..20), 0..40)
    ) {
        let tasks = grow_graph(&statuses, &edges);
        let completed: HashSet<&str> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .map(|t| t.id.as_str())
            .collect();

        let executable: Vec<&str> = executable_tasks(&tasks).into_iter().map(|t| t.id.as_str()).collect();
        let expected: Vec<&str> = tasks
            .iter()
            .filter(|t| {
                t.status == TaskStatus::Todo
                    && t.depends_on.iter().all(|d| completed.contains(d.as_str()))
            })
            .map(|t| t.id.as_str())
            .collect();

        prop_assert_eq!(&executable, &expected);
        for task in &tasks {
            prop_assert_eq!(is_executable(task, &tasks), expected.contains(&task.id.as_str()));
        }
    }
}
