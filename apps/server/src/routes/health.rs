//! # Health Route

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Liveness probe; also confirms the active store answers queries.
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let store = state.registry.store().await;
    let status = if store.health_check().await { "UP" } else { "DEGRADED" };

    Json(HealthResponse {
        status,
        timestamp: Utc::now().to_rfc3339(),
    })
}
