//! Query-string DTOs for the HTTP API

use serde::Deserialize;

use crate::task::TaskStatus;

/// Query for `GET /tasks`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    /// Only tasks in this status
    pub status: Option<TaskStatus>,
}

/// Query for `GET /memories`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryListQuery {
    /// Only memories carrying this tag
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_query_parses_status() {
        let query: TaskListQuery = serde_json::from_str(r#"{"status":"in_progress"}"#).unwrap();
        assert_eq!(query.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn test_task_query_rejects_unknown_status() {
        assert!(serde_json::from_str::<TaskListQuery>(r#"{"status":"done"}"#).is_err());
    }

    #[test]
    fn test_empty_queries() {
        let tasks: TaskListQuery = serde_json::from_str("{}").unwrap();
        let memories: MemoryListQuery = serde_json::from_str("{}").unwrap();
        assert!(tasks.status.is_none());
        assert!(memories.tag.is_none());
    }
}
