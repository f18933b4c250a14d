//! # Sales Routes
//!
//! `POST /sales/finalize` - the entry point of the billing transaction.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use dukaan_core::{CartLine, FulfillmentType, PaymentInfo, PaymentMethod, SaleContext, TaxRate};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineDto {
    pub item_id: i64,
    pub name: String,
    pub qty: i64,
    /// Unit price in paise.
    pub unit_price: i64,
    /// Tax rate in percent (5.0 = 5%).
    #[serde(default)]
    pub tax_rate: f64,
    /// MRP in paise, if printed on the package.
    pub mrp: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSaleRequest {
    pub cart: Vec<CartLineDto>,
    /// Sale total in paise; any discount is already applied.
    pub total: i64,
    pub fulfillment_type: FulfillmentType,
    pub table_number: Option<i64>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cash_received: i64,
    #[serde(default)]
    pub change_due: i64,
    pub cashier_identity: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSaleResponse {
    pub bill_id: i64,
    pub total: i64,
}

/// Finalizes a sale: validates stock, decrements it, writes the bill with
/// its frozen invoice snapshot, and clears the table for dine-in.
pub async fn finalize(
    State(state): State<SharedState>,
    Json(req): Json<FinalizeSaleRequest>,
) -> Result<Json<FinalizeSaleResponse>, ApiError> {
    if req.total < 0 {
        return Err(ApiError::validation("total must not be negative"));
    }

    let cart: Vec<CartLine> = req
        .cart
        .iter()
        .map(|line| CartLine {
            item_id: line.item_id,
            name: line.name.clone(),
            qty: line.qty,
            unit_price_paise: line.unit_price,
            tax_rate_bps: TaxRate::from_percentage(line.tax_rate).bps(),
            mrp_paise: line.mrp,
        })
        .collect();

    let payment = PaymentInfo {
        method: req.payment_method,
        cash_received_paise: req.cash_received,
        change_due_paise: req.change_due,
    };

    let context = SaleContext {
        fulfillment: req.fulfillment_type,
        table_no: req.table_number,
        billed_by: req.cashier_identity,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        total_paise: req.total,
    };

    let store = state.registry.store().await;
    let receipt = store.billing().finalize_sale(&cart, &payment, &context).await?;

    Ok(Json(FinalizeSaleResponse {
        bill_id: receipt.bill_id,
        total: receipt.total_paise,
    }))
}
