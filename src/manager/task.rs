//! Task manager: validated task writes over the entity store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheStats};
use crate::error::{Error, Result};
use crate::manager::{next_id, optional_text, required_text, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH};
use crate::store::{DurableStore, EntityStore};
use crate::task::{
    apply_status_update, dependents, executable_tasks, topological_order, validate_no_cycle,
    IdKey, Task, TaskPriority, TaskStatus,
};

// == Inputs ==
/// Fields accepted when creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub depends_on: Option<Vec<String>>,
    pub progress_note: Option<String>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.progress_note = Some(note.into());
        self
    }
}

// == Task Manager ==
/// Owns the task store and enforces graph and lifecycle rules on every write.
///
/// Writes are serialized by an internal mutex, so the snapshot a write is validated
/// against is the one it is applied to.
pub struct TaskManager {
    store: EntityStore<Task>,
    write_lock: Mutex<()>,
}

impl TaskManager {
    pub fn new(durable: Arc<dyn DurableStore<Task>>, cache: CacheConfig) -> Result<Self> {
        Ok(Self {
            store: EntityStore::new("task", durable, cache)?,
            write_lock: Mutex::new(()),
        })
    }

    // == Create ==
    pub async fn create(&self, input: NewTask) -> Result<Task> {
        let title = required_text("title", &input.title, MAX_TITLE_LENGTH)?;
        let description = optional_text("description", &input.description, MAX_CONTENT_LENGTH)?;

        let _guard = self.write_lock.lock().await;
        let all = self.snapshot().await?;
        let id = next_id(all.iter().map(|t| t.id.as_str()))?;
        let depends_on = normalize_dependencies(&id, input.depends_on, &all)?;

        let mut task = Task::new(id, title);
        task.description = description;
        task.priority = input.priority;
        task.depends_on = depends_on;
        validate_no_cycle(&task, &all)?;

        self.store.save(&task.id, &task).await?;
        info!(task_id = %task.id, deps = task.depends_on.len(), "task created");
        Ok(task)
    }

    // == Get ==
    pub async fn get(&self, id: &str) -> Result<Option<Task>> {
        self.store.load(id).await
    }

    // == Update ==
    /// Applies `update` to task `id`. Nothing is written unless every check passes.
    pub async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let _guard = self.write_lock.lock().await;
        let mut task = self.store.require(id).await?;

        let title = update
            .title
            .as_deref()
            .map(|t| required_text("title", t, MAX_TITLE_LENGTH))
            .transpose()?;
        let description = update
            .description
            .as_deref()
            .map(|d| optional_text("description", d, MAX_CONTENT_LENGTH))
            .transpose()?;

        if let Some(deps) = update.depends_on {
            let all = self.snapshot().await?;
            let deps = normalize_dependencies(&task.id, deps, &all)?;
            let mut candidate = task.clone();
            candidate.depends_on = deps;
            validate_no_cycle(&candidate, &all)?;
            task.depends_on = candidate.depends_on;
        }

        apply_status_update(
            &mut task,
            update.status,
            update.progress_note.as_deref(),
            Utc::now(),
        )?;
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }

        self.store.save(&task.id, &task).await?;
        info!(task_id = %task.id, status = %task.status, "task updated");
        Ok(task)
    }

    // == Delete ==
    /// Deletes a task nothing else depends on.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let all = self.snapshot().await?;
        let blocked: Vec<&str> = dependents(id, &all)
            .into_iter()
            .map(|t| t.id.as_str())
            .filter(|dep| *dep != id)
            .collect();
        if !blocked.is_empty() {
            warn!(task_id = id, ?blocked, "refusing to delete prerequisite task");
            return Err(Error::validation(
                "id",
                format!("task {} is a prerequisite of {}", id, blocked.join(", ")),
            ));
        }
        self.store.delete(id).await
    }

    // == Queries ==
    /// All tasks in id order, optionally filtered by status.
    pub async fn list(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        let all = self.snapshot().await?;
        Ok(all
            .into_iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .collect())
    }

    /// Tasks ready to start, in id order.
    pub async fn executable(&self) -> Result<Vec<Task>> {
        let all = self.snapshot().await?;
        Ok(executable_tasks(&all).into_iter().cloned().collect())
    }

    /// All tasks, prerequisites first.
    pub async fn ordered(&self) -> Result<Vec<Task>> {
        let all = self.snapshot().await?;
        Ok(topological_order(&all).into_iter().cloned().collect())
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.store.stats().await
    }

    /// Every stored task, sorted by id.
    async fn snapshot(&self) -> Result<Vec<Task>> {
        let mut all = self.store.load_all().await?;
        all.sort_by(|a, b| IdKey::new(&a.id).cmp(&IdKey::new(&b.id)));
        Ok(all)
    }
}

/// Trims, de-duplicates (first occurrence wins) and checks each prerequisite id.
fn normalize_dependencies(id: &str, deps: Vec<String>, all: &[Task]) -> Result<Vec<String>> {
    let known: HashSet<&str> = all.iter().map(|t| t.id.as_str()).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(deps.len());

    for dep in deps {
        let dep = dep.trim().to_string();
        if dep.is_empty() {
            return Err(Error::validation("depends_on", "ids must not be empty"));
        }
        if dep == id {
            return Err(Error::validation(
                "depends_on",
                format!("task {} cannot depend on itself", id),
            ));
        }
        if !known.contains(dep.as_str()) {
            return Err(Error::validation(
                "depends_on",
                format!("unknown task id {}", dep),
            ));
        }
        if seen.insert(dep.clone()) {
            out.push(dep);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn manager() -> (Arc<MemoryStore<Task>>, TaskManager) {
        let durable = Arc::new(MemoryStore::<Task>::new());
        let manager = TaskManager::new(
            durable.clone(),
            CacheConfig::new(16, Duration::from_secs(60)),
        )
        .unwrap();
        (durable, manager)
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_allocates_ids_and_defaults() {
        let (_, manager) = manager();

        let first = manager.create(NewTask::new("  first ")).await.unwrap();
        let second = manager.create(NewTask::new("second")).await.unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert_eq!(first.title, "first");
        assert_eq!(first.status, TaskStatus::Todo);
        assert!(first.progress_notes.is_empty());
    }

    #[tokio::test]
    async fn test_create_fails_when_numeric_ids_exhausted() {
        let (durable, manager) = manager();
        let last = u64::MAX.to_string();
        durable
            .save(&last, &Task::new(last.clone(), "last"))
            .await
            .unwrap();

        let err = manager.create(NewTask::new("one more")).await.unwrap_err();

        assert!(matches!(err, Error::Validation { ref field, .. } if field == "id"));
        assert_eq!(durable.list_ids().await.unwrap(), vec![last]);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_and_self_dependencies() {
        let (durable, manager) = manager();

        let err = manager
            .create(NewTask::new("t").depends_on(["42"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "depends_on"));

        let err = manager
            .create(NewTask::new("t").depends_on(["1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(durable.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_dedupes_dependencies() {
        let (_, manager) = manager();
        manager.create(NewTask::new("a")).await.unwrap();
        manager.create(NewTask::new("b")).await.unwrap();

        let task = manager
            .create(NewTask::new("c").depends_on(["2", "1", "2"]))
            .await
            .unwrap();

        assert_eq!(task.depends_on, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_update_cycle_rejected_before_write() {
        let (durable, manager) = manager();
        manager.create(NewTask::new("a")).await.unwrap();
        manager
            .create(NewTask::new("b").depends_on(["1"]))
            .await
            .unwrap();

        let update = TaskUpdate {
            depends_on: Some(vec!["2".to_string()]),
            ..TaskUpdate::default()
        };
        match manager.update("1", update).await {
            Err(Error::Cycle { path }) => {
                assert!(path.contains(&"1".to_string()));
                assert!(path.contains(&"2".to_string()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }

        let stored = durable.load("1").await.unwrap().unwrap();
        assert!(stored.depends_on.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_, manager) = manager();

        let result = manager.update("9", TaskUpdate::status(TaskStatus::InProgress)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_terminal_task_accepts_notes_only() {
        let (_, manager) = manager();
        manager.create(NewTask::new("a")).await.unwrap();
        manager
            .update("1", TaskUpdate::status(TaskStatus::InProgress))
            .await
            .unwrap();
        manager
            .update("1", TaskUpdate::status(TaskStatus::Completed))
            .await
            .unwrap();

        let err = manager
            .update("1", TaskUpdate::status(TaskStatus::InProgress))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));

        let task = manager
            .update("1", TaskUpdate::status(TaskStatus::Completed).with_note("retro done"))
            .await
            .unwrap();
        assert_eq!(task.progress_notes.len(), 1);
        assert!(task.progress_notes[0].ends_with(": retro done"));
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let (durable, manager) = manager();
        manager.create(NewTask::new("a")).await.unwrap();

        let update = TaskUpdate {
            title: Some("renamed".to_string()),
            status: Some(TaskStatus::Completed),
            ..TaskUpdate::default()
        };
        assert!(manager.update("1", update).await.is_err());

        let stored = durable.load("1").await.unwrap().unwrap();
        assert_eq!(stored.title, "a");
        assert_eq!(stored.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_delete_refuses_prerequisites() {
        let (_, manager) = manager();
        manager.create(NewTask::new("a")).await.unwrap();
        manager
            .create(NewTask::new("b").depends_on(["1"]))
            .await
            .unwrap();

        assert!(matches!(
            manager.delete("1").await,
            Err(Error::Validation { .. })
        ));
        assert!(manager.delete("2").await.unwrap());
        assert!(manager.delete("1").await.unwrap());
        assert!(!manager.delete("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_and_order_use_numeric_ids() {
        let (_, manager) = manager();
        for i in 0..11 {
            manager.create(NewTask::new(format!("t{}", i))).await.unwrap();
        }
        manager
            .update(
                "2",
                TaskUpdate {
                    depends_on: Some(vec!["11".to_string()]),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();

        let listed = manager.list(None).await.unwrap();
        assert_eq!(ids(&listed)[..3], ["1", "2", "3"]);
        assert_eq!(ids(&listed)[10], "11");

        let ordered = manager.ordered().await.unwrap();
        let pos = |id: &str| ordered.iter().position(|t| t.id == id).unwrap();
        assert!(pos("11") < pos("2"));

        let executable = manager.executable().await.unwrap();
        assert!(!ids(&executable).contains(&"2"));
        assert_eq!(executable.len(), 10);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let (_, manager) = manager();
        manager.create(NewTask::new("a")).await.unwrap();
        manager.create(NewTask::new("b")).await.unwrap();
        manager
            .update("2", TaskUpdate::status(TaskStatus::Cancelled))
            .await
            .unwrap();

        let cancelled = manager.list(Some(TaskStatus::Cancelled)).await.unwrap();
        assert_eq!(ids(&cancelled), vec!["2"]);
    }
}
