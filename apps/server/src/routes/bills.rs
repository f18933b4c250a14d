//! # Bill History Routes
//!
//! Read-only access to finalized bills. The frozen invoice snapshot travels
//! with each bill so receipts re-render exactly as originally printed.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use dukaan_core::{Bill, BillLine, FulfillmentType, PaymentMethod, TaxRate};
use dukaan_db::BillFilter;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillListQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// "CASH" | "UPI" | "CARD" | "ALL"
    pub payment_method: Option<String>,
    /// "DINE_IN" | "TAKE_AWAY" | "ALL"
    #[serde(rename = "type")]
    pub fulfillment_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDto {
    pub id: i64,
    /// Total in paise.
    pub total: i64,
    pub fulfillment_type: FulfillmentType,
    pub table_number: Option<i64>,
    pub payment_method: PaymentMethod,
    pub cash_received: i64,
    pub change_due: i64,
    pub billed_by: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Frozen invoice configuration, as JSON.
    pub invoice_config_snapshot: String,
    pub created_at: DateTime<Utc>,
}

impl From<Bill> for BillDto {
    fn from(bill: Bill) -> Self {
        BillDto {
            id: bill.id,
            total: bill.total_paise,
            fulfillment_type: bill.fulfillment,
            table_number: bill.table_no,
            payment_method: bill.payment_method,
            cash_received: bill.cash_received_paise,
            change_due: bill.change_due_paise,
            billed_by: bill.billed_by,
            customer_name: bill.customer_name,
            customer_phone: bill.customer_phone,
            invoice_config_snapshot: bill.invoice_config_snapshot,
            created_at: bill.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLineDto {
    pub id: i64,
    pub item_name: String,
    pub qty: i64,
    /// Unit price in paise, as copied at sale time.
    pub unit_price: i64,
    /// Tax rate in percent, as copied at sale time.
    pub tax_rate: f64,
    pub mrp: Option<i64>,
}

impl From<BillLine> for BillLineDto {
    fn from(line: BillLine) -> Self {
        BillLineDto {
            id: line.id,
            item_name: line.item_name,
            qty: line.qty,
            unit_price: line.unit_price_paise,
            tax_rate: TaxRate::from_bps(line.tax_rate_bps).percentage(),
            mrp: line.mrp_paise,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDetailDto {
    #[serde(flatten)]
    pub bill: BillDto,
    pub items: Vec<BillLineDto>,
}

/// Recent bills, filtered and newest first.
pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<BillListQuery>,
) -> Result<Json<Vec<BillDto>>, ApiError> {
    let filter = BillFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        payment_method: parse_filter(query.payment_method.as_deref())?,
        fulfillment: parse_filter(query.fulfillment_type.as_deref())?,
    };

    let store = state.registry.store().await;
    let bills = store.billing().list_bills(&filter).await?;
    Ok(Json(bills.into_iter().map(BillDto::from).collect()))
}

/// One bill with its lines.
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<BillDetailDto>, ApiError> {
    let store = state.registry.store().await;
    let (bill, lines) = store
        .billing()
        .get_bill(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", id))?;

    Ok(Json(BillDetailDto {
        bill: bill.into(),
        items: lines.into_iter().map(BillLineDto::from).collect(),
    }))
}

/// Parses an optional filter value; "ALL" and absence both mean no filter.
fn parse_filter<T: std::str::FromStr<Err = dukaan_core::CoreError>>(
    value: Option<&str>,
) -> Result<Option<T>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.eq_ignore_ascii_case("ALL") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(ApiError::from),
    }
}
