//! Liveness and readiness checks for container orchestration.
//!
//! `/health` answers as long as the process can serve HTTP at all. `/ready`
//! answers 200 while the lifecycle is running and 503 once draining has begun,
//! so the orchestrator stops routing traffic to a pod that is shutting down.

use axum::{extract::State, http::StatusCode, Json};

use crate::lifecycle::{HealthReport, ReadinessReport};
use crate::state::AppState;

/// Liveness check handler.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(
        state
            .lifecycle
            .health(&state.config.environment, &state.config.version),
    )
}

/// Readiness check handler.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessReport>) {
    let report = state.lifecycle.readiness();
    let status = if report.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
