//! # Configuration Repository
//!
//! Singleton settings rows (id = 1) per business-mode store: invoice
//! presentation, table count, dashboard panels, and the store's own
//! app-config record.
//!
//! Reads fall back to defaults if the row is somehow missing; writes always
//! target the singleton row.

use sqlx::SqlitePool;
use tracing::debug;

use dukaan_core::{
    CoreError, DashboardConfig, InvoiceConfig, Mode, TableConfig, ValidationError,
};

use crate::error::{DbError, DbResult};

/// Repository for the per-store configuration singletons.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// Inserts the singleton rows on first open of a fresh store.
    /// Idempotent: `INSERT OR IGNORE` leaves existing rows alone.
    pub async fn ensure_defaults(&self, mode: Mode) -> DbResult<()> {
        sqlx::query("INSERT OR IGNORE INTO app_config (id, mode) VALUES (1, ?1)")
            .bind(mode)
            .execute(&self.pool)
            .await?;

        let invoice = InvoiceConfig::default();
        sqlx::query(
            "INSERT OR IGNORE INTO invoice_config \
             (id, heading, company_name, address, gst_number, fssai_id, show_watermark, force_bold) \
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&invoice.heading)
        .bind(&invoice.company_name)
        .bind(&invoice.address)
        .bind(&invoice.gst_number)
        .bind(&invoice.fssai_id)
        .bind(invoice.show_watermark)
        .bind(invoice.force_bold)
        .execute(&self.pool)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO table_config (id, total_tables) VALUES (1, ?1)")
            .bind(TableConfig::default().total_tables)
            .execute(&self.pool)
            .await?;

        let dashboard = DashboardConfig::default();
        sqlx::query(
            "INSERT OR IGNORE INTO dashboard_config \
             (id, show_sales_trend, show_revenue_breakdown, show_top_items, \
              show_payment_methods, show_stock_alerts, default_time_range) \
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(dashboard.show_sales_trend)
        .bind(dashboard.show_revenue_breakdown)
        .bind(dashboard.show_top_items)
        .bind(dashboard.show_payment_methods)
        .bind(dashboard.show_stock_alerts)
        .bind(dashboard.default_time_range)
        .execute(&self.pool)
        .await?;

        debug!(%mode, "Singleton config rows ensured");
        Ok(())
    }

    /// Reads the invoice configuration.
    pub async fn invoice(&self) -> DbResult<InvoiceConfig> {
        let config = sqlx::query_as::<_, InvoiceConfig>(
            "SELECT heading, company_name, address, gst_number, fssai_id, show_watermark, \
             force_bold FROM invoice_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(config.unwrap_or_default())
    }

    /// Replaces the invoice configuration.
    ///
    /// Bills already finalized are untouched; they carry their own frozen
    /// snapshot.
    pub async fn set_invoice(&self, config: &InvoiceConfig) -> DbResult<()> {
        sqlx::query(
            "UPDATE invoice_config SET heading = ?1, company_name = ?2, address = ?3, \
             gst_number = ?4, fssai_id = ?5, show_watermark = ?6, force_bold = ?7 WHERE id = 1",
        )
        .bind(&config.heading)
        .bind(&config.company_name)
        .bind(&config.address)
        .bind(&config.gst_number)
        .bind(&config.fssai_id)
        .bind(config.show_watermark)
        .bind(config.force_bold)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads the dine-in table count.
    pub async fn tables(&self) -> DbResult<TableConfig> {
        let config = sqlx::query_as::<_, TableConfig>(
            "SELECT total_tables FROM table_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(config.unwrap_or_default())
    }

    /// Sets the dine-in table count.
    pub async fn set_total_tables(&self, total: i64) -> DbResult<()> {
        if total < 1 {
            return Err(DbError::Domain(CoreError::Validation(
                ValidationError::MustBePositive {
                    field: "total tables".to_string(),
                },
            )));
        }

        sqlx::query("UPDATE table_config SET total_tables = ?1 WHERE id = 1")
            .bind(total)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Reads the dashboard panel configuration.
    pub async fn dashboard(&self) -> DbResult<DashboardConfig> {
        let config = sqlx::query_as::<_, DashboardConfig>(
            "SELECT show_sales_trend, show_revenue_breakdown, show_top_items, \
             show_payment_methods, show_stock_alerts, default_time_range \
             FROM dashboard_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(config.unwrap_or_default())
    }

    /// Replaces the dashboard panel configuration.
    pub async fn set_dashboard(&self, config: &DashboardConfig) -> DbResult<()> {
        sqlx::query(
            "UPDATE dashboard_config SET show_sales_trend = ?1, show_revenue_breakdown = ?2, \
             show_top_items = ?3, show_payment_methods = ?4, show_stock_alerts = ?5, \
             default_time_range = ?6 WHERE id = 1",
        )
        .bind(config.show_sales_trend)
        .bind(config.show_revenue_breakdown)
        .bind(config.show_top_items)
        .bind(config.show_payment_methods)
        .bind(config.show_stock_alerts)
        .bind(config.default_time_range)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The mode this store was created for (its own app-config row).
    pub async fn app_mode(&self) -> DbResult<Option<Mode>> {
        let mode = sqlx::query_scalar::<_, Mode>("SELECT mode FROM app_config WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(mode)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use dukaan_core::TimeRange;

    async fn store() -> Store {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        store.configs().ensure_defaults(Mode::Restaurant).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_defaults_round_trip() {
        let store = store().await;

        let invoice = store.configs().invoice().await.unwrap();
        assert_eq!(invoice, InvoiceConfig::default());

        let tables = store.configs().tables().await.unwrap();
        assert_eq!(tables.total_tables, 10);

        assert_eq!(
            store.configs().app_mode().await.unwrap(),
            Some(Mode::Restaurant)
        );
    }

    #[tokio::test]
    async fn test_ensure_defaults_is_idempotent() {
        let store = store().await;

        let mut invoice = store.configs().invoice().await.unwrap();
        invoice.gst_number = "29ABCDE1234F1Z5".to_string();
        store.configs().set_invoice(&invoice).await.unwrap();

        // Second ensure must not reset the edited row.
        store.configs().ensure_defaults(Mode::Restaurant).await.unwrap();
        let reread = store.configs().invoice().await.unwrap();
        assert_eq!(reread.gst_number, "29ABCDE1234F1Z5");
    }

    #[tokio::test]
    async fn test_set_total_tables_validates() {
        let store = store().await;
        store.configs().set_total_tables(16).await.unwrap();
        assert_eq!(store.configs().tables().await.unwrap().total_tables, 16);

        assert!(store.configs().set_total_tables(0).await.is_err());
    }

    #[tokio::test]
    async fn test_dashboard_round_trip() {
        let store = store().await;

        let mut dashboard = store.configs().dashboard().await.unwrap();
        dashboard.show_top_items = false;
        dashboard.default_time_range = TimeRange::Last30Days;
        store.configs().set_dashboard(&dashboard).await.unwrap();

        let reread = store.configs().dashboard().await.unwrap();
        assert!(!reread.show_top_items);
        assert_eq!(reread.default_time_range, TimeRange::Last30Days);
    }
}
