//! Error types for the task cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::task::TaskStatus;

// == Error Enum ==
/// Unified error type for caches, stores and managers.
#[derive(Error, Debug)]
pub enum Error {
    /// Entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Status change not permitted by the lifecycle
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Dependency edges would form a cycle
    #[error("Dependency cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    /// Rejected input
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Rejected configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Durable store I/O failure
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidTransition { .. } | Error::Cycle { .. } => StatusCode::CONFLICT,
            Error::InvalidConfig(_) | Error::Io(_) | Error::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            Error::Cycle { path } => json!({ "error": self.to_string(), "path": path }),
            Error::Validation { field, .. } => json!({ "error": self.to_string(), "field": field }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = Error::Cycle {
            path: vec!["1".into(), "2".into(), "1".into()],
        };
        assert_eq!(err.to_string(), "Dependency cycle detected: 1 -> 2 -> 1");
    }

    #[test]
    fn test_transition_message() {
        let err = Error::InvalidTransition {
            from: TaskStatus::Completed,
            to: TaskStatus::Todo,
        };
        assert_eq!(err.to_string(), "Invalid status transition: completed -> todo");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::validation("title", "empty").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Cycle { path: vec![] }.into_response().status(),
            StatusCode::CONFLICT
        );
    }
}
