//! # Settings Routes
//!
//! The per-store configuration singletons. Invoice and dashboard mutations
//! are SUPER_ADMIN only; editing the invoice config never rewrites the
//! frozen snapshots on existing bills.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use dukaan_core::{CoreError, DashboardConfig, InvoiceConfig, Role, TimeRange};

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::SharedState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceConfigDto {
    pub heading: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: String,
    pub fssai_id: String,
    pub show_watermark: bool,
    pub force_bold: bool,
}

impl From<InvoiceConfig> for InvoiceConfigDto {
    fn from(config: InvoiceConfig) -> Self {
        InvoiceConfigDto {
            heading: config.heading,
            company_name: config.company_name,
            address: config.address,
            gst_number: config.gst_number,
            fssai_id: config.fssai_id,
            show_watermark: config.show_watermark,
            force_bold: config.force_bold,
        }
    }
}

impl From<InvoiceConfigDto> for InvoiceConfig {
    fn from(dto: InvoiceConfigDto) -> Self {
        InvoiceConfig {
            heading: dto.heading,
            company_name: dto.company_name,
            address: dto.address,
            gst_number: dto.gst_number,
            fssai_id: dto.fssai_id,
            show_watermark: dto.show_watermark,
            force_bold: dto.force_bold,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetInvoiceRequest {
    #[serde(flatten)]
    pub config: InvoiceConfigDto,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfigResponse {
    pub total_tables: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetTablesRequest {
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfigDto {
    pub show_sales_trend: bool,
    pub show_revenue_breakdown: bool,
    pub show_top_items: bool,
    pub show_payment_methods: bool,
    pub show_stock_alerts: bool,
    pub default_time_range: TimeRange,
}

impl From<DashboardConfig> for DashboardConfigDto {
    fn from(config: DashboardConfig) -> Self {
        DashboardConfigDto {
            show_sales_trend: config.show_sales_trend,
            show_revenue_breakdown: config.show_revenue_breakdown,
            show_top_items: config.show_top_items,
            show_payment_methods: config.show_payment_methods,
            show_stock_alerts: config.show_stock_alerts,
            default_time_range: config.default_time_range,
        }
    }
}

impl From<DashboardConfigDto> for DashboardConfig {
    fn from(dto: DashboardConfigDto) -> Self {
        DashboardConfig {
            show_sales_trend: dto.show_sales_trend,
            show_revenue_breakdown: dto.show_revenue_breakdown,
            show_top_items: dto.show_top_items,
            show_payment_methods: dto.show_payment_methods,
            show_stock_alerts: dto.show_stock_alerts,
            default_time_range: dto.default_time_range,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDashboardRequest {
    #[serde(flatten)]
    pub config: DashboardConfigDto,
    pub role: Role,
}

fn require_super_admin(role: Role) -> Result<(), ApiError> {
    if !role.is_super_admin() {
        return Err(CoreError::Unauthorized {
            required: Role::SuperAdmin,
        }
        .into());
    }
    Ok(())
}

/// Current invoice presentation settings.
pub async fn invoice(
    State(state): State<SharedState>,
) -> Result<Json<InvoiceConfigDto>, ApiError> {
    let store = state.registry.store().await;
    let config = store.configs().invoice().await?;
    Ok(Json(config.into()))
}

/// Replaces the invoice settings. SUPER_ADMIN only.
pub async fn set_invoice(
    State(state): State<SharedState>,
    Json(req): Json<SetInvoiceRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_super_admin(req.role)?;

    let store = state.registry.store().await;
    store.configs().set_invoice(&req.config.into()).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Current dine-in table count.
pub async fn tables(
    State(state): State<SharedState>,
) -> Result<Json<TableConfigResponse>, ApiError> {
    let store = state.registry.store().await;
    let config = store.configs().tables().await?;
    Ok(Json(TableConfigResponse {
        total_tables: config.total_tables,
    }))
}

/// Sets the dine-in table count.
pub async fn set_tables(
    State(state): State<SharedState>,
    Json(req): Json<SetTablesRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let store = state.registry.store().await;
    store.configs().set_total_tables(req.total).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Current dashboard panel settings.
pub async fn dashboard(
    State(state): State<SharedState>,
) -> Result<Json<DashboardConfigDto>, ApiError> {
    let store = state.registry.store().await;
    let config = store.configs().dashboard().await?;
    Ok(Json(config.into()))
}

/// Replaces the dashboard panel settings. SUPER_ADMIN only.
pub async fn set_dashboard(
    State(state): State<SharedState>,
    Json(req): Json<SetDashboardRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_super_admin(req.role)?;

    let store = state.registry.store().await;
    store.configs().set_dashboard(&req.config.into()).await?;
    Ok(Json(SuccessResponse::ok()))
}
