//! # Stock Routes
//!
//! Manual stock adjustments (with audit trail) plus the wholesale-price and
//! description edits offered on the stock screen. ADMIN or SUPER_ADMIN only.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use dukaan_core::{CoreError, Role};

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub id: i64,
    pub stock: i64,
    pub role: Role,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWholesaleRequest {
    pub id: i64,
    pub wholesale_price: Option<i64>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDescriptionRequest {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    pub role: Role,
}

fn require_stock_access(role: Role) -> Result<(), ApiError> {
    if !role.can_adjust_stock() {
        return Err(CoreError::Unauthorized {
            required: Role::Admin,
        }
        .into());
    }
    Ok(())
}

/// Sets an item's stock to an absolute value, recording who changed it.
pub async fn update(
    State(state): State<SharedState>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_stock_access(req.role)?;

    let store = state.registry.store().await;
    store
        .items()
        .set_stock(req.id, req.stock, req.username.as_deref().unwrap_or("Unknown"))
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Updates an item's wholesale price.
pub async fn update_wholesale(
    State(state): State<SharedState>,
    Json(req): Json<UpdateWholesaleRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_stock_access(req.role)?;

    let store = state.registry.store().await;
    store.items().set_wholesale(req.id, req.wholesale_price).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Updates an item's description.
pub async fn update_description(
    State(state): State<SharedState>,
    Json(req): Json<UpdateDescriptionRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_stock_access(req.role)?;

    let store = state.registry.store().await;
    store.items().set_description(req.id, &req.description).await?;

    Ok(Json(SuccessResponse::ok()))
}
