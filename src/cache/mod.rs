//! Cache Module
//!
//! Generic bounded cache with lazy TTL expiration and LRU eviction.

mod bounded;
mod config;
mod entry;
mod lru;
mod stats;


// Re-export public types
pub use bounded::BoundedCache;
pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
