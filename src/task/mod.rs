//! Task Module
//!
//! Task data model, status lifecycle, and dependency graph views.

pub mod graph;
pub mod lifecycle;
mod model;

#[cfg(test)]
mod property_tests;

pub use graph::{
    dependents, executable_tasks, is_executable, topological_order, unmet_dependencies,
    validate_no_cycle,
};
pub use lifecycle::{apply_status_update, check_transition};
pub use model::{IdKey, Task, TaskPriority, TaskStatus};
