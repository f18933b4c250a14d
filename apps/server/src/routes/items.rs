//! # Item Routes
//!
//! Catalog listing and CRUD. All prices travel as paise, tax rates as
//! percent.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use dukaan_core::{Item, TaxRate};
use dukaan_db::{NewItem, UpdateItem};

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    /// Unit price in paise.
    pub price: i64,
    /// Tax rate in percent.
    pub tax_rate: f64,
    pub category: String,
    pub stock: i64,
    pub active: bool,
    pub is_favorite: bool,
    pub product_code: i64,
    pub mrp: Option<i64>,
    pub wholesale_price: Option<i64>,
    pub description: String,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        ItemDto {
            id: item.id,
            name: item.name,
            price: item.price_paise,
            tax_rate: TaxRate::from_bps(item.tax_rate_bps).percentage(),
            category: item.category,
            stock: item.stock,
            active: item.active,
            is_favorite: item.is_favorite,
            product_code: item.product_code,
            mrp: item.mrp_paise,
            wholesale_price: item.wholesale_paise,
            description: item.description,
            expiry_date: item.expiry_date,
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub tax_rate: f64,
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    pub mrp: Option<i64>,
    pub wholesale_price: Option<i64>,
    #[serde(default)]
    pub description: String,
    pub expiry_date: Option<NaiveDate>,
    pub product_code: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemResponse {
    pub success: bool,
    pub id: i64,
    pub product_code: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub id: i64,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub tax_rate: f64,
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    pub mrp: Option<i64>,
    pub wholesale_price: Option<i64>,
    #[serde(default)]
    pub description: String,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleActiveRequest {
    pub id: i64,
    pub active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    pub id: i64,
    pub is_favorite: bool,
}

/// Active catalog, grouped by category.
pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<ItemDto>>, ApiError> {
    let store = state.registry.store().await;
    let items = store.items().list_active().await?;
    Ok(Json(items.into_iter().map(ItemDto::from).collect()))
}

/// Barcode lookup by product code.
pub async fn by_code(
    State(state): State<SharedState>,
    Path(code): Path<i64>,
) -> Result<Json<ItemDto>, ApiError> {
    let store = state.registry.store().await;
    let item = store
        .items()
        .find_by_product_code(code)
        .await?
        .ok_or_else(|| ApiError::not_found("Item", code))?;
    Ok(Json(item.into()))
}

/// Creates a catalog item.
pub async fn add(
    State(state): State<SharedState>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<AddItemResponse>, ApiError> {
    let store = state.registry.store().await;
    let item = store
        .items()
        .insert(NewItem {
            name: req.name,
            price_paise: req.price,
            tax_rate_bps: TaxRate::from_percentage(req.tax_rate).bps(),
            category: req.category.unwrap_or_else(|| "Others".to_string()),
            stock: req.stock,
            mrp_paise: req.mrp,
            wholesale_paise: req.wholesale_price,
            description: req.description,
            expiry_date: req.expiry_date,
            product_code: req.product_code,
        })
        .await?;

    Ok(Json(AddItemResponse {
        success: true,
        id: item.id,
        product_code: item.product_code,
    }))
}

/// Edits a catalog item. Historical bill lines keep their copied values.
pub async fn update(
    State(state): State<SharedState>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let store = state.registry.store().await;
    store
        .items()
        .update(UpdateItem {
            id: req.id,
            name: req.name,
            price_paise: req.price,
            tax_rate_bps: TaxRate::from_percentage(req.tax_rate).bps(),
            category: req.category.unwrap_or_else(|| "Others".to_string()),
            stock: req.stock,
            mrp_paise: req.mrp,
            wholesale_paise: req.wholesale_price,
            description: req.description,
            expiry_date: req.expiry_date,
        })
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Soft-deletes or restores an item.
pub async fn toggle(
    State(state): State<SharedState>,
    Json(req): Json<ToggleActiveRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let store = state.registry.store().await;
    store.items().set_active(req.id, req.active).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Pins or unpins an item on the billing screen.
pub async fn toggle_favorite(
    State(state): State<SharedState>,
    Json(req): Json<ToggleFavoriteRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let store = state.registry.store().await;
    store.items().set_favorite(req.id, req.is_favorite).await?;
    Ok(Json(SuccessResponse::ok()))
}
