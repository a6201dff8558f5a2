//! Health and metrics endpoints, mounted on both services

use crate::api::{HealthResponse, HealthStatus};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{extract::State, Json};
use bookgate_core::Store;
use tracing::warn;

fn health(state: &AppState, status: HealthStatus) -> HealthResponse {
    HealthResponse {
        status,
        service: state.service.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        store: state.store.backend().to_string(),
    }
}

/// Health check - liveness probe
pub async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health(&state, HealthStatus::Healthy))
}

/// Health check - readiness probe, pings the store
pub async fn health_ready(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    match state.store.ping().await {
        Ok(()) => Ok(Json(health(&state, HealthStatus::Healthy))),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            Err(ApiError::ServiceUnavailable("Store not reachable".to_string()))
        }
    }
}

/// Prometheus metrics endpoint
pub async fn metrics() -> String {
    crate::metrics::get_prometheus_metrics()
}
