//! # License Routes
//!
//! Status, activation, and removal of the installed license blob.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use dukaan_core::LicenseInfo;

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStatusResponse {
    pub has_license: bool,
    pub license: Option<LicenseInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    pub license_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateResponse {
    pub success: bool,
    pub message: String,
    pub license: LicenseInfo,
}

/// Current license, re-read from disk.
pub async fn status(State(state): State<SharedState>) -> Json<LicenseStatusResponse> {
    let license = state.license.refresh().await;
    Json(LicenseStatusResponse {
        has_license: license.is_some(),
        license,
    })
}

/// Verifies and installs a license key.
pub async fn activate(
    State(state): State<SharedState>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>, ApiError> {
    if req.license_key.trim().is_empty() {
        return Err(ApiError::validation("License key is required"));
    }

    let info = state.license.activate(&req.license_key).await?;

    if !info.is_active() {
        return Err(ApiError::license(format!(
            "License saved but is currently {:?}",
            info.status
        )));
    }

    Ok(Json(ActivateResponse {
        success: true,
        message: "License activated successfully".to_string(),
        license: info,
    }))
}

/// Uninstalls the license.
pub async fn remove(
    State(state): State<SharedState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.license.remove().await?;
    Ok(Json(SuccessResponse::ok()))
}
