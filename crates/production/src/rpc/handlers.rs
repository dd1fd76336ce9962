//! HTTP request handlers for the RPC API.

use super::state::RpcState;
use super::types::*;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use prometheus::{Encoder, TextEncoder};
use std::sync::atomic::Ordering;

/// Handler for `GET /health` - liveness probe.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Handler for `GET /ready` - readiness probe.
pub async fn ready_handler(State(state): State<RpcState>) -> impl IntoResponse {
    if state.ready.load(Ordering::SeqCst) {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready".to_string(),
                ready: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not_ready".to_string(),
                ready: false,
            }),
        )
    }
}

/// Handler for `GET /metrics` - Prometheus metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = ?e, "failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to encode metrics".to_string(),
        )
            .into_response();
    }

    (
        [(
            axum::http::header::CONTENT_TYPE,
            encoder.format_type().to_string(),
        )],
        buffer,
    )
        .into_response()
}

/// Handler for `GET /api/v1/status` - monitor status.
pub async fn status_handler(State(state): State<RpcState>) -> impl IntoResponse {
    let status = state.status.read().await;
    let uptime = state.start_time.elapsed().as_secs();

    Json(MonitorStatusResponse {
        witness: status.witness.clone(),
        samples: status.samples,
        total_missed: status.total_missed,
        ticks_since_last_miss: status.samples.saturating_sub(status.tick_of_last_miss),
        last_miss_delta: status.last_miss_delta,
        active_key_prefix: status.active_key_prefix.clone(),
        rotations: status.rotations,
        rotation_retries: status.rotation_retries,
        retry_pending: status.retry_pending,
        uptime_secs: uptime,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
