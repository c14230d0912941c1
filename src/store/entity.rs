//! Read-through / write-through cache in front of a durable store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{BoundedCache, CacheConfig, CacheStats};
use crate::error::{Error, Result};
use crate::store::DurableStore;

// == Entity Store ==
/// Combines one [`DurableStore`] with one [`BoundedCache`].
///
/// The cache lock is released before any durable I/O starts. Two concurrent saves of
/// the same id are last-write-wins; callers needing more serialize their writes.
/// A load that raced with a save or delete never fills the cache, so the cached copy
/// is always the one the last completed write put there.
pub struct EntityStore<T> {
    /// Entity kind, used in logs and error messages
    kind: &'static str,
    durable: Arc<dyn DurableStore<T>>,
    cache: RwLock<BoundedCache<String, T>>,
    /// Bumped under the cache write lock by every save and delete
    writes: AtomicU64,
}

impl<T> EntityStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    pub fn new(
        kind: &'static str,
        durable: Arc<dyn DurableStore<T>>,
        config: CacheConfig,
    ) -> Result<Self> {
        Ok(Self {
            kind,
            durable,
            cache: RwLock::new(BoundedCache::new(config)?),
            writes: AtomicU64::new(0),
        })
    }

    // == Load ==
    /// Cache first; on a miss read the durable store and populate the cache.
    ///
    /// The result is only cached if no write completed while the durable read was in
    /// flight; otherwise it is returned as-is and the cache keeps the newer value.
    pub async fn load(&self, id: &str) -> Result<Option<T>> {
        let key = id.to_string();
        let seen = {
            let mut cache = self.cache.write().await;
            if let Some(value) = cache.get(&key) {
                return Ok(Some(value));
            }
            self.writes.load(Ordering::Acquire)
        };

        let loaded = self.durable.load(id).await?;
        if let Some(value) = &loaded {
            let mut cache = self.cache.write().await;
            if self.writes.load(Ordering::Acquire) == seen {
                cache.set(key, value.clone());
                debug!(kind = self.kind, id, "loaded from durable store");
            } else {
                debug!(kind = self.kind, id, "write raced with load; not caching");
            }
        }
        Ok(loaded)
    }

    /// Like [`load`](Self::load) but a missing entity is [`Error::NotFound`].
    pub async fn require(&self, id: &str) -> Result<T> {
        self.load(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.kind, id)))
    }

    // == Save ==
    /// Writes durably, then refreshes the cached copy.
    pub async fn save(&self, id: &str, value: &T) -> Result<()> {
        self.durable.save(id, value).await?;
        let mut cache = self.cache.write().await;
        self.writes.fetch_add(1, Ordering::Release);
        cache.set(id.to_string(), value.clone());
        drop(cache);
        info!(kind = self.kind, id, "saved");
        Ok(())
    }

    // == Delete ==
    /// Deletes durably, then evicts the cached copy.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.durable.delete(id).await?;
        let mut cache = self.cache.write().await;
        self.writes.fetch_add(1, Ordering::Release);
        cache.delete(&id.to_string());
        drop(cache);
        if removed {
            info!(kind = self.kind, id, "deleted");
        }
        Ok(removed)
    }

    // == Listing ==
    pub async fn list_ids(&self) -> Result<Vec<String>> {
        self.durable.list_ids().await
    }

    /// Loads every stored entity. Ids that vanish between listing and loading are skipped.
    pub async fn load_all(&self) -> Result<Vec<T>> {
        let ids = self.list_ids().await?;
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.load(&id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.size()
    }
}
