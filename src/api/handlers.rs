//! API Handlers
//!
//! HTTP request handlers for each endpoint. Handlers only translate between HTTP and
//! the managers; every rule lives in the managers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::CacheConfig;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::manager::{
    ContextEntry, ContextManager, ContextUpdate, Memory, MemoryManager, MemoryUpdate, NewContext,
    NewMemory, NewTask, TaskManager, TaskUpdate,
};
use crate::models::{
    DeleteResponse, HealthResponse, MemoryListQuery, StatsResponse, TaskListQuery,
};
use crate::store::{JsonFileStore, MemoryStore};
use crate::task::Task;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskManager>,
    pub memories: Arc<MemoryManager>,
    pub contexts: Arc<ContextManager>,
}

impl AppState {
    pub fn new(tasks: TaskManager, memories: MemoryManager, contexts: ContextManager) -> Self {
        Self {
            tasks: Arc::new(tasks),
            memories: Arc::new(memories),
            contexts: Arc::new(contexts),
        }
    }

    /// State backed by in-process stores; nothing touches the disk.
    pub fn in_memory(cache: CacheConfig) -> Result<Self> {
        Ok(Self::new(
            TaskManager::new(Arc::new(MemoryStore::<Task>::new()), cache)?,
            MemoryManager::new(Arc::new(MemoryStore::<Memory>::new()), cache)?,
            ContextManager::new(Arc::new(MemoryStore::<ContextEntry>::new()), cache)?,
        ))
    }

    /// State backed by JSON documents under `config.data_dir`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let cache = config.cache_config();
        let tasks = JsonFileStore::<Task>::open(config.data_dir.join("tasks")).await?;
        let memories = JsonFileStore::<Memory>::open(config.data_dir.join("memories")).await?;
        let contexts =
            JsonFileStore::<ContextEntry>::open(config.data_dir.join("contexts")).await?;

        Ok(Self::new(
            TaskManager::new(Arc::new(tasks), cache)?,
            MemoryManager::new(Arc::new(memories), cache)?,
            ContextManager::new(Arc::new(contexts), cache)?,
        ))
    }
}

fn found<T>(kind: &str, id: &str, value: Option<T>) -> Result<Json<T>> {
    value
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("{} {}", kind, id)))
}

fn deleted(kind: &str, id: String, removed: bool) -> Result<Json<DeleteResponse>> {
    if removed {
        Ok(Json(DeleteResponse::new(kind, id)))
    } else {
        Err(Error::NotFound(format!("{} {}", kind, id)))
    }
}

// == Tasks ==

/// Handler for POST /tasks
pub async fn create_task_handler(
    State(state): State<AppState>,
    Json(input): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Handler for GET /tasks
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list(query.status).await?))
}

/// Handler for GET /tasks/executable
pub async fn executable_tasks_handler(State(state): State<AppState>) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.tasks.executable().await?))
}

/// Handler for GET /tasks/order
pub async fn ordered_tasks_handler(State(state): State<AppState>) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.tasks.ordered().await?))
}

/// Handler for GET /tasks/:id
pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>> {
    found("task", &id, state.tasks.get(&id).await?)
}

/// Handler for PATCH /tasks/:id
pub async fn update_task_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>> {
    Ok(Json(state.tasks.update(&id, update).await?))
}

/// Handler for DELETE /tasks/:id
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.tasks.delete(&id).await?;
    deleted("task", id, removed)
}

// == Memories ==

/// Handler for POST /memories
pub async fn create_memory_handler(
    State(state): State<AppState>,
    Json(input): Json<NewMemory>,
) -> Result<(StatusCode, Json<Memory>)> {
    let memory = state.memories.create(input).await?;
    Ok((StatusCode::CREATED, Json(memory)))
}

/// Handler for GET /memories
pub async fn list_memories_handler(
    State(state): State<AppState>,
    Query(query): Query<MemoryListQuery>,
) -> Result<Json<Vec<Memory>>> {
    Ok(Json(state.memories.list(query.tag.as_deref()).await?))
}

/// Handler for GET /memories/:id
pub async fn get_memory_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Memory>> {
    found("memory", &id, state.memories.get(&id).await?)
}

/// Handler for PUT /memories/:id
pub async fn update_memory_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<MemoryUpdate>,
) -> Result<Json<Memory>> {
    Ok(Json(state.memories.update(&id, update).await?))
}

/// Handler for DELETE /memories/:id
pub async fn delete_memory_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.memories.delete(&id).await?;
    deleted("memory", id, removed)
}

// == Contexts ==

/// Handler for POST /contexts
pub async fn create_context_handler(
    State(state): State<AppState>,
    Json(input): Json<NewContext>,
) -> Result<(StatusCode, Json<ContextEntry>)> {
    let entry = state.contexts.create(input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler for GET /contexts
pub async fn list_contexts_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContextEntry>>> {
    Ok(Json(state.contexts.list().await?))
}

/// Handler for GET /contexts/:id
pub async fn get_context_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContextEntry>> {
    found("context", &id, state.contexts.get(&id).await?)
}

/// Handler for PUT /contexts/:id
pub async fn update_context_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ContextUpdate>,
) -> Result<Json<ContextEntry>> {
    Ok(Json(state.contexts.update(&id, update).await?))
}

/// Handler for DELETE /contexts/:id
pub async fn delete_context_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let removed = state.contexts.delete(&id).await?;
    deleted("context", id, removed)
}

// == Operational ==

/// Handler for GET /stats
///
/// Cache counters per entity kind.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        tasks: state.tasks.cache_stats().await.into(),
        memories: state.memories.cache_stats().await.into(),
        contexts: state.contexts.cache_stats().await.into(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
