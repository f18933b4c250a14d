//! # Report Routes
//!
//! All-time totals plus the audit-history listings.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use dukaan_core::{LoginEvent, StockChange};
use dukaan_db::repository::reports::{DailyTotal, ItemTotal, MonthlyTotal};
use dukaan_db::{LoginHistoryFilter, StockHistoryFilter};

use crate::error::ApiError;
use crate::state::SharedState;

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistoryQuery {
    pub username: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHistoryQuery {
    pub item_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// All-time revenue per day.
pub async fn daily(State(state): State<SharedState>) -> Result<Json<Vec<DailyTotal>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().daily_totals().await?))
}

/// All-time revenue per month.
pub async fn monthly(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MonthlyTotal>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().monthly_totals().await?))
}

/// All-time sales per item name.
pub async fn items(State(state): State<SharedState>) -> Result<Json<Vec<ItemTotal>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().item_totals().await?))
}

/// Login/logout audit trail.
pub async fn login_history(
    State(state): State<SharedState>,
    Query(query): Query<LoginHistoryQuery>,
) -> Result<Json<Vec<LoginEvent>>, ApiError> {
    let filter = LoginHistoryFilter {
        username: query.username,
        start_date: query.start_date,
        end_date: query.end_date,
        limit: query.limit,
        offset: query.offset,
    };

    let store = state.registry.store().await;
    Ok(Json(store.history().login_history(&filter).await?))
}

/// Manual stock-change audit trail.
pub async fn stock_history(
    State(state): State<SharedState>,
    Query(query): Query<StockHistoryQuery>,
) -> Result<Json<Vec<StockChange>>, ApiError> {
    let filter = StockHistoryFilter {
        item_name: query.item_name,
        start_date: query.start_date,
        end_date: query.end_date,
        limit: query.limit,
        offset: query.offset,
    };

    let store = state.registry.store().await;
    Ok(Json(store.history().stock_history(&filter).await?))
}
