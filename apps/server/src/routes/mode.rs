//! # Mode Routes
//!
//! `GET /mode` / `POST /mode` - the mode registry's HTTP surface. Reads
//! refresh the license first so enforcement corrections apply on the read
//! path; writes are SUPER_ADMIN only.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use dukaan_core::{Mode, Role};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub mode: Mode,
}

/// Current business mode, after license enforcement.
pub async fn get_mode(State(state): State<SharedState>) -> Result<Json<ModeResponse>, ApiError> {
    let license = state.license.refresh().await;
    let mode = state.registry.current_mode(license.as_ref()).await?;
    Ok(Json(ModeResponse { mode }))
}

/// Switches the business mode and swaps the active store.
pub async fn set_mode(
    State(state): State<SharedState>,
    Json(req): Json<SetModeRequest>,
) -> Result<Json<ModeResponse>, ApiError> {
    let mode: Mode = req.mode.parse().map_err(ApiError::from)?;

    let license = state.license.refresh().await;
    let mode = state
        .registry
        .set_mode(mode, req.role, license.as_ref())
        .await?;

    Ok(Json(ModeResponse { mode }))
}
