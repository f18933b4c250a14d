//! # Audit History Repository
//!
//! Read side of the append-only audit logs (stock changes, logins). The
//! writes happen as best-effort side effects in the item and user
//! repositories.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use dukaan_core::{LoginEvent, StockChange};

use crate::error::DbResult;

/// Filter for stock-history listings.
#[derive(Debug, Clone)]
pub struct StockHistoryFilter {
    /// Substring match on the item name.
    pub item_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for StockHistoryFilter {
    fn default() -> Self {
        StockHistoryFilter {
            item_name: None,
            start_date: None,
            end_date: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Filter for login-history listings.
#[derive(Debug, Clone)]
pub struct LoginHistoryFilter {
    pub username: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for LoginHistoryFilter {
    fn default() -> Self {
        LoginHistoryFilter {
            username: None,
            start_date: None,
            end_date: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Repository over the audit tables.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        HistoryRepository { pool }
    }

    /// Lists stock adjustments, newest first.
    pub async fn stock_history(&self, filter: &StockHistoryFilter) -> DbResult<Vec<StockChange>> {
        let mut sql = String::from(
            "SELECT id, item_id, item_name, old_stock, new_stock, change_amount, changed_by, \
             changed_at FROM stock_history WHERE 1=1",
        );
        if filter.item_name.is_some() {
            sql.push_str(" AND item_name LIKE ?");
        }
        if filter.start_date.is_some() {
            sql.push_str(" AND DATE(changed_at) >= DATE(?)");
        }
        if filter.end_date.is_some() {
            sql.push_str(" AND DATE(changed_at) <= DATE(?)");
        }
        sql.push_str(" ORDER BY changed_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, StockChange>(&sql);
        if let Some(name) = &filter.item_name {
            query = query.bind(format!("%{name}%"));
        }
        if let Some(start) = filter.start_date {
            query = query.bind(start);
        }
        if let Some(end) = filter.end_date {
            query = query.bind(end);
        }
        query = query.bind(filter.limit).bind(filter.offset);

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Lists login/logout events, newest first.
    pub async fn login_history(&self, filter: &LoginHistoryFilter) -> DbResult<Vec<LoginEvent>> {
        let mut sql = String::from(
            "SELECT id, username, action, occurred_at FROM login_history WHERE 1=1",
        );
        if filter.username.is_some() {
            sql.push_str(" AND username = ?");
        }
        if filter.start_date.is_some() {
            sql.push_str(" AND DATE(occurred_at) >= DATE(?)");
        }
        if filter.end_date.is_some() {
            sql.push_str(" AND DATE(occurred_at) <= DATE(?)");
        }
        sql.push_str(" ORDER BY occurred_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, LoginEvent>(&sql);
        if let Some(username) = &filter.username {
            query = query.bind(username);
        }
        if let Some(start) = filter.start_date {
            query = query.bind(start);
        }
        if let Some(end) = filter.end_date {
            query = query.bind(end);
        }
        query = query.bind(filter.limit).bind(filter.offset);

        Ok(query.fetch_all(&self.pool).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
