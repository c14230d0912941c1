//! Task data model

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Task Status ==
/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true once no further transitions are accepted
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Returns true if dependents may start
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Task Priority ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        };
        f.write_str(s)
    }
}

// == Task ==
/// A unit of work with prerequisites and an append-only progress log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Ids of tasks that must be completed first
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// `"<timestamp>: <text>"` records, oldest first
    #[serde(default)]
    pub progress_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a `todo` task with no dependencies or notes.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::default(),
            depends_on: Vec::new(),
            progress_notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.depends_on.iter().any(|d| d == id)
    }
}

// == Id Ordering ==
/// Sort key for entity ids: numeric-looking ids by value, then everything else
/// lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdKey<'a> {
    numeric: Option<u128>,
    raw: &'a str,
}

impl<'a> IdKey<'a> {
    pub fn new(id: &'a str) -> Self {
        Self {
            numeric: id.parse().ok(),
            raw: id,
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

impl Ord for IdKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric, other.numeric) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.raw.cmp(other.raw)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.raw.cmp(other.raw),
        }
    }
}

impl PartialOrd for IdKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("1", "Write docs");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.depends_on.is_empty());
        assert!(task.progress_notes.is_empty());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let status: TaskStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, TaskStatus::Cancelled);
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TaskStatus::Todo.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_id_key_numeric_order() {
        let mut ids = vec!["10", "9", "b", "100", "a", "2"];
        ids.sort_by(|a, b| IdKey::new(a).cmp(&IdKey::new(b)));
        assert_eq!(ids, vec!["2", "9", "10", "100", "a", "b"]);
    }

    #[test]
    fn test_task_document_roundtrip_keeps_dependency_order() {
        let task = Task::new("3", "Ship").with_dependencies(["2", "1"]);
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.depends_on, vec!["2", "1"]);
        assert_eq!(back, task);
    }
}
