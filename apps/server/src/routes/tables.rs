//! # Table Routes (Dine-In)
//!
//! `GET /tables` and `POST /tables/{n}/order`. A table beyond the configured
//! count is unknown; saving an empty cart clears the table.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use dukaan_core::{OrderLine, TableEntry};

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SaveOrderRequest {
    pub items: Vec<OrderLine>,
}

/// One entry per table 1..N with its occupancy and parked order.
pub async fn list_tables(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TableEntry>>, ApiError> {
    let store = state.registry.store().await;
    let total = store.configs().tables().await?.total_tables;
    let tables = store.orders().list_tables(total).await?;
    Ok(Json(tables))
}

/// Upserts (or clears, when empty) a table's unpaid order.
pub async fn save_order(
    State(state): State<SharedState>,
    Path(table): Path<i64>,
    Json(req): Json<SaveOrderRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let store = state.registry.store().await;

    let total = store.configs().tables().await?.total_tables;
    if table > total {
        return Err(ApiError::not_found("Table", table));
    }

    store.orders().save(table, &req.items).await?;
    Ok(Json(SuccessResponse::ok()))
}
