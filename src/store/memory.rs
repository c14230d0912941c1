//! In-process durable store, used by tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::DurableStore;

/// Map-backed [`DurableStore`]. Counts loads so tests can observe cache hits.
#[derive(Debug)]
pub struct MemoryStore<T> {
    items: RwLock<HashMap<String, T>>,
    loads: AtomicU64,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            loads: AtomicU64::new(0),
        }
    }

    /// Number of `load` calls that reached this store.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> DurableStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    async fn save(&self, id: &str, entity: &T) -> Result<()> {
        self.items.write().await.insert(id.to_string(), entity.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<T>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.items.write().await.remove(id).is_some())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.items.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
