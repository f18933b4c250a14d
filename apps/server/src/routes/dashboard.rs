//! # Dashboard Routes
//!
//! Aggregations for the dashboard panels, all scoped to a time range.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use dukaan_core::TimeRange;
use dukaan_db::repository::reports::{
    CategoryRevenue, DashboardSummary, ExpiryAlerts, LowStockItem, PaymentShare, TopItem,
    TrendPoint,
};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: TimeRange,
}

fn default_top_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct TopItemsQuery {
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default = "default_top_limit")]
    pub limit: i64,
}

/// Bill count, revenue, and average ticket.
pub async fn summary(
    State(state): State<SharedState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().summary(query.range).await?))
}

/// Revenue per day, oldest first.
pub async fn sales_trend(
    State(state): State<SharedState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<TrendPoint>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().sales_trend(query.range).await?))
}

/// Revenue per category.
pub async fn revenue_breakdown(
    State(state): State<SharedState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<CategoryRevenue>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().revenue_breakdown(query.range).await?))
}

/// Best sellers by quantity.
pub async fn top_items(
    State(state): State<SharedState>,
    Query(query): Query<TopItemsQuery>,
) -> Result<Json<Vec<TopItem>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(
        store.reports().top_items(query.range, query.limit).await?,
    ))
}

/// Bill count and revenue per payment method.
pub async fn payment_methods(
    State(state): State<SharedState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<PaymentShare>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().payment_methods(query.range).await?))
}

/// Active items with stock below 10.
pub async fn stock_alerts(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LowStockItem>>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().stock_alerts(10, 10).await?))
}

/// In-stock items approaching expiry, bucketed by urgency.
pub async fn expiry_alerts(
    State(state): State<SharedState>,
) -> Result<Json<ExpiryAlerts>, ApiError> {
    let store = state.registry.store().await;
    Ok(Json(store.reports().expiry_alerts().await?))
}
