//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::*;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /tasks`, `GET /tasks?status=` - Create / list tasks
/// - `GET /tasks/executable` - Tasks ready to start
/// - `GET /tasks/order` - Tasks in dependency order
/// - `GET|PATCH|DELETE /tasks/:id`
/// - `POST /memories`, `GET /memories?tag=`, `GET|PUT|DELETE /memories/:id`
/// - `POST /contexts`, `GET /contexts`, `GET|PUT|DELETE /contexts/:id`
/// - `GET /stats` - Cache statistics per entity kind
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (the server is meant for local use)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tasks", post(create_task_handler).get(list_tasks_handler))
        .route("/tasks/executable", get(executable_tasks_handler))
        .route("/tasks/order", get(ordered_tasks_handler))
        .route(
            "/tasks/:id",
            get(get_task_handler)
                .patch(update_task_handler)
                .delete(delete_task_handler),
        )
        .route(
            "/memories",
            post(create_memory_handler).get(list_memories_handler),
        )
        .route(
            "/memories/:id",
            get(get_memory_handler)
                .put(update_memory_handler)
                .delete(delete_memory_handler),
        )
        .route(
            "/contexts",
            post(create_context_handler).get(list_contexts_handler),
        )
        .route(
            "/contexts/:id",
            get(get_context_handler)
                .put(update_context_handler)
                .delete(delete_context_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::in_memory(CacheConfig::default()).unwrap();
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_static_routes_win_over_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tasks/executable")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_task_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tasks/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
