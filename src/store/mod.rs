//! Store Module
//!
//! Durable entity storage behind a bounded read-through/write-through cache.

mod entity;
mod json_file;
mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub use entity::EntityStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

// == Durable Store ==
/// Persistent storage for one entity kind, keyed by id.
///
/// A missing entity is `Ok(None)` / `Ok(false)`, never an error.
#[async_trait]
pub trait DurableStore<T>: Send + Sync {
    async fn save(&self, id: &str, entity: &T) -> Result<()>;

    async fn load(&self, id: &str) -> Result<Option<T>>;

    /// Returns whether something was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn list_ids(&self) -> Result<Vec<String>>;
}
