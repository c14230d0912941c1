//! Request and Response models for the HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP query strings and response bodies. Entity bodies
//! (`NewTask`, `TaskUpdate`, ...) are deserialized straight into manager inputs.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{MemoryListQuery, TaskListQuery};
pub use responses::{CacheStatsView, DeleteResponse, HealthResponse, StatsResponse};
