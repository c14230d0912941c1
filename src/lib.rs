//! Taskcache - local memory, task and context manager
//!
//! Entities are stored as JSON documents behind bounded TTL caches. Tasks form a
//! dependency graph that is kept acyclic on every write and drives a status lifecycle.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod store;
pub mod task;

pub use api::AppState;
pub use config::Config;
pub use error::{Error, Result};
