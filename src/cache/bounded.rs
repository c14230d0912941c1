//! Bounded Cache Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and lazy TTL expiration.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::cache::{CacheConfig, CacheEntry, CacheStats, LruTracker};
use crate::error::Result;

// == Bounded Cache ==
/// Capacity- and age-bounded key/value cache.
///
/// Expiry is checked only when a key is looked up; nothing sweeps the map in the
/// background, so [`size`](Self::size) may count entries that are logically expired.
/// The cache is not internally synchronized; wrap it in a lock to share it.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    lru: LruTracker<K>,
    stats: CacheStats,
    config: CacheConfig,
}

impl<K, V> BoundedCache<K, V>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache, rejecting an invalid config.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: HashMap::with_capacity(config.max_size.min(1024)),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            config,
        })
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// An expired entry is evicted here and counted as a miss.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                debug!(?key, "cache miss");
                return None;
            }
            Some(entry) => entry.is_expired(self.config.ttl),
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_miss();
            debug!(?key, "cache entry expired");
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Has ==
    /// Same lookup as [`get`](Self::get), including expiry and statistics.
    pub fn has(&mut self, key: &K) -> bool {
        self.get(key).is_some()
    }

    // == Set ==
    /// Inserts or replaces `key`, making it most recently used with age zero.
    ///
    /// A new key inserted at capacity evicts the least recently used entry first,
    /// whether or not that entry has expired.
    pub fn set(&mut self, key: K, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_size {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                debug!(key = ?evicted, "cache eviction");
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value));
    }

    // == Delete ==
    /// Removes `key`. Statistics are untouched.
    pub fn delete(&mut self, key: &K) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Drops every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Size ==
    /// Entry count, including expired entries not yet looked up.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
