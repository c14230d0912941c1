//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with age tracking.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value plus the instant it was inserted.
///
/// Owned by [`BoundedCache`](super::BoundedCache); callers only ever see clones of `value`.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was (re)inserted
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry whose age starts at zero.
    pub fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since insertion.
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    // == Is Expired ==
    /// Checks whether the entry's age exceeds `ttl`.
    ///
    /// An entry exactly `ttl` old is still live; it expires once its age is strictly
    /// greater.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}
