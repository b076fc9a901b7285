//! Liveness endpoint.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub executor: &'static str,
    pub version: &'static str,
}

/// GET /healthz - unauthenticated, for kubelet probes.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        executor: state.broker.executor().kind(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
