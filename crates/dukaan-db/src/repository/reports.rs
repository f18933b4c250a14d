//! # Reports Repository
//!
//! Read-only aggregations over bills and items: dashboard panels and the
//! reports screen. Row structs serialize straight to the HTTP layer.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use dukaan_core::{PaymentMethod, TimeRange};

use crate::error::DbResult;

// =============================================================================
// Row Types
// =============================================================================

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_bills: i64,
    pub total_sales_paise: i64,
    pub avg_bill_paise: i64,
}

/// One day of the sales trend.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_paise: i64,
    pub bill_count: i64,
}

/// Revenue contribution of one category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue_paise: i64,
    pub quantity: i64,
}

/// One row of the top-sellers list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    pub item_name: String,
    pub total_qty: i64,
    pub revenue_paise: i64,
}

/// Share of one payment method.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentShare {
    pub payment_method: PaymentMethod,
    pub bill_count: i64,
    pub total_paise: i64,
}

/// An active item running low on stock.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: i64,
    pub name: String,
    pub stock: i64,
    pub category: String,
}

/// An in-stock item approaching its expiry date.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringItem {
    pub id: i64,
    pub name: String,
    pub stock: i64,
    pub category: String,
    pub expiry_date: NaiveDate,
}

/// Expiry alerts bucketed by urgency.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiryAlerts {
    /// Expiring within 7 days.
    pub critical: Vec<ExpiringItem>,
    /// Expiring in 8-30 days.
    pub urgent: Vec<ExpiringItem>,
    /// Expiring in 31-60 days.
    pub upcoming: Vec<ExpiringItem>,
}

/// One day of all-time daily totals.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_paise: i64,
}

/// One month of all-time monthly totals.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub month: String,
    pub total_paise: i64,
}

/// All-time sales of one item name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemTotal {
    pub item_name: String,
    pub total_qty: i64,
    pub total_paise: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// SQL predicate over `created_at` for a time range. These are constant
/// fragments, never interpolated with user input.
fn date_filter(range: TimeRange) -> &'static str {
    match range {
        TimeRange::Today => "DATE(created_at) = DATE('now')",
        TimeRange::Last7Days => "created_at >= datetime('now', '-7 days')",
        TimeRange::Last30Days => "created_at >= datetime('now', '-30 days')",
        TimeRange::Last3Months => "created_at >= datetime('now', '-3 months')",
    }
}

/// Repository for dashboard and report aggregations.
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: SqlitePool,
}

impl ReportsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportsRepository { pool }
    }

    /// Bill count, revenue sum, and average ticket for the range.
    pub async fn summary(&self, range: TimeRange) -> DbResult<DashboardSummary> {
        let sql = format!(
            "SELECT COUNT(*) AS total_bills, \
             COALESCE(SUM(total_paise), 0) AS total_sales_paise, \
             CAST(COALESCE(AVG(total_paise), 0) AS INTEGER) AS avg_bill_paise \
             FROM bills WHERE {}",
            date_filter(range)
        );
        Ok(sqlx::query_as(&sql).fetch_one(&self.pool).await?)
    }

    /// Revenue per day, oldest first.
    pub async fn sales_trend(&self, range: TimeRange) -> DbResult<Vec<TrendPoint>> {
        let sql = format!(
            "SELECT DATE(created_at) AS date, \
             COALESCE(SUM(total_paise), 0) AS total_paise, \
             COUNT(*) AS bill_count \
             FROM bills WHERE {} \
             GROUP BY DATE(created_at) ORDER BY date ASC",
            date_filter(range)
        );
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    /// Revenue per catalog category, highest first.
    ///
    /// Bill lines carry copied names, so this joins back to the live catalog
    /// by name; renamed items drop out of the breakdown by design.
    pub async fn revenue_breakdown(&self, range: TimeRange) -> DbResult<Vec<CategoryRevenue>> {
        let sql = format!(
            "SELECT i.category AS category, \
             COALESCE(SUM(bl.qty * bl.unit_price_paise), 0) AS revenue_paise, \
             COALESCE(SUM(bl.qty), 0) AS quantity \
             FROM bill_lines bl \
             JOIN items i ON bl.item_name = i.name \
             JOIN bills b ON bl.bill_id = b.id \
             WHERE {} \
             GROUP BY i.category ORDER BY revenue_paise DESC",
            date_filter(range).replace("created_at", "b.created_at")
        );
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    /// Best sellers by quantity.
    pub async fn top_items(&self, range: TimeRange, limit: i64) -> DbResult<Vec<TopItem>> {
        let sql = format!(
            "SELECT bl.item_name AS item_name, \
             COALESCE(SUM(bl.qty), 0) AS total_qty, \
             COALESCE(SUM(bl.qty * bl.unit_price_paise), 0) AS revenue_paise \
             FROM bill_lines bl \
             JOIN bills b ON bl.bill_id = b.id \
             WHERE {} \
             GROUP BY bl.item_name ORDER BY total_qty DESC LIMIT ?",
            date_filter(range).replace("created_at", "b.created_at")
        );
        Ok(sqlx::query_as(&sql).bind(limit).fetch_all(&self.pool).await?)
    }

    /// Bill count and revenue per payment method.
    pub async fn payment_methods(&self, range: TimeRange) -> DbResult<Vec<PaymentShare>> {
        let sql = format!(
            "SELECT payment_method, COUNT(*) AS bill_count, \
             COALESCE(SUM(total_paise), 0) AS total_paise \
             FROM bills WHERE {} GROUP BY payment_method",
            date_filter(range)
        );
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    /// Active items with stock below `threshold`, most depleted first.
    pub async fn stock_alerts(&self, threshold: i64, limit: i64) -> DbResult<Vec<LowStockItem>> {
        Ok(sqlx::query_as(
            "SELECT id, name, stock, category FROM items \
             WHERE active = 1 AND stock < ?1 ORDER BY stock ASC LIMIT ?2",
        )
        .bind(threshold)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    /// In-stock active items expiring within 60 days, bucketed by urgency.
    pub async fn expiry_alerts(&self) -> DbResult<ExpiryAlerts> {
        let items: Vec<ExpiringItem> = sqlx::query_as(
            "SELECT id, name, stock, category, expiry_date FROM items \
             WHERE active = 1 AND stock > 0 AND expiry_date IS NOT NULL \
             AND DATE(expiry_date) >= DATE('now') \
             AND DATE(expiry_date) <= DATE('now', '+60 days') \
             ORDER BY expiry_date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let today = Utc::now().date_naive();
        let mut alerts = ExpiryAlerts {
            critical: Vec::new(),
            urgent: Vec::new(),
            upcoming: Vec::new(),
        };

        for item in items {
            let days_left = (item.expiry_date - today).num_days();
            if days_left <= 7 {
                alerts.critical.push(item);
            } else if days_left <= 30 {
                alerts.urgent.push(item);
            } else {
                alerts.upcoming.push(item);
            }
        }

        Ok(alerts)
    }

    /// All-time revenue per day.
    pub async fn daily_totals(&self) -> DbResult<Vec<DailyTotal>> {
        Ok(sqlx::query_as(
            "SELECT DATE(created_at) AS date, COALESCE(SUM(total_paise), 0) AS total_paise \
             FROM bills GROUP BY DATE(created_at) ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// All-time revenue per month (`YYYY-MM`).
    pub async fn monthly_totals(&self) -> DbResult<Vec<MonthlyTotal>> {
        Ok(sqlx::query_as(
            "SELECT strftime('%Y-%m', created_at) AS month, \
             COALESCE(SUM(total_paise), 0) AS total_paise \
             FROM bills GROUP BY month ORDER BY month ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// All-time quantity and revenue per sold item name.
    pub async fn item_totals(&self) -> DbResult<Vec<ItemTotal>> {
        Ok(sqlx::query_as(
            "SELECT item_name, COALESCE(SUM(qty), 0) AS total_qty, \
             COALESCE(SUM(qty * unit_price_paise), 0) AS total_paise \
             FROM bill_lines GROUP BY item_name ORDER BY total_qty DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
