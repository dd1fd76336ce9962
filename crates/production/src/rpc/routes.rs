//! Route configuration for the RPC API.

use super::handlers::*;
use super::state::RpcState;
use axum::{routing::get, Router};

/// Create the full router with all RPC routes.
pub fn create_router(state: RpcState) -> Router {
    Router::new()
        // Health & readiness probes (no prefix)
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        // Metrics (no prefix, for Prometheus scraping)
        .route("/metrics", get(metrics_handler))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
}

/// Create the `/api/v1` router.
fn api_v1_routes() -> Router<RpcState> {
    Router::new().route("/status", get(status_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::MonitorStatusState;
    use axum::{body::Body, http::Request};
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn create_test_state() -> RpcState {
        RpcState {
            ready: Arc::new(AtomicBool::new(true)),
            status: Arc::new(RwLock::new(MonitorStatusState {
                witness: "init-witness".to_string(),
                samples: 100,
                total_missed: 7,
                tick_of_last_miss: 60,
                active_key_prefix: "BTS_primary_key".to_string(),
                rotations: 0,
                rotation_retries: 0,
                retry_pending: false,
                last_miss_delta: None,
            })),
            start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn test_router_health() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_status() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_metrics() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
