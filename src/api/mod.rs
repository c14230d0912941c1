//! API Module
//!
//! HTTP handlers and routing for the operator REST API.
//!
//! # Endpoints
//! - `/tasks` - Task CRUD, executable set and dependency order
//! - `/memories` - Memory CRUD
//! - `/contexts` - Context CRUD
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
