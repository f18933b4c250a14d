//! # Active Order Repository (Dine-In Tables)
//!
//! Tracks unpaid, in-progress carts per table. One row per occupied table;
//! the row's presence IS the table's OCCUPIED state.
//!
//! A table frees up in exactly two ways: an explicit empty save ("cleared
//! without paying") or as a side effect of finalizing a DINE_IN sale for it.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use dukaan_core::{validation, ActiveOrder, CoreError, OrderLine, TableEntry, TableStatus};

use crate::error::{DbError, DbResult};

/// Raw row shape; `lines` is a JSON blob.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    table_no: i64,
    lines: String,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn parse(self) -> DbResult<ActiveOrder> {
        let lines: Vec<OrderLine> = serde_json::from_str(&self.lines)
            .map_err(|e| DbError::Internal(format!("corrupt order blob for table {}: {e}", self.table_no)))?;
        Ok(ActiveOrder {
            table_no: self.table_no,
            lines,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for dine-in table orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Saves a table's cart. An empty cart clears the table.
    pub async fn save(&self, table_no: i64, lines: &[OrderLine]) -> DbResult<()> {
        validation::validate_table_number(table_no).map_err(CoreError::from)?;

        if lines.is_empty() {
            return self.clear(table_no).await;
        }

        let blob = serde_json::to_string(lines)
            .map_err(|e| DbError::Internal(format!("order serialization: {e}")))?;

        sqlx::query(
            "INSERT OR REPLACE INTO active_orders (table_no, lines, updated_at) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(table_no)
        .bind(&blob)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(table_no, lines = lines.len(), "Active order saved");
        Ok(())
    }

    /// Gets the active order for a table, if occupied.
    pub async fn get(&self, table_no: i64) -> DbResult<Option<ActiveOrder>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT table_no, lines, updated_at FROM active_orders WHERE table_no = ?1",
        )
        .bind(table_no)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::parse).transpose()
    }

    /// Clears a table (no error if it was already free).
    pub async fn clear(&self, table_no: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM active_orders WHERE table_no = ?1")
            .bind(table_no)
            .execute(&self.pool)
            .await?;

        debug!(table_no, "Active order cleared");
        Ok(())
    }

    /// Returns one entry per table 1..=total: OCCUPIED with the order
    /// contents if an active order exists, AVAILABLE otherwise.
    pub async fn list_tables(&self, total_tables: i64) -> DbResult<Vec<TableEntry>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT table_no, lines, updated_at FROM active_orders",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut occupied = std::collections::HashMap::with_capacity(rows.len());
        for row in rows {
            let order = row.parse()?;
            occupied.insert(order.table_no, order);
        }

        let mut tables = Vec::with_capacity(total_tables.max(0) as usize);
        for id in 1..=total_tables {
            let entry = match occupied.remove(&id) {
                Some(order) => TableEntry {
                    id,
                    status: TableStatus::Occupied,
                    order: order.lines,
                },
                None => TableEntry {
                    id,
                    status: TableStatus::Available,
                    order: Vec::new(),
                },
            };
            tables.push(entry);
        }

        Ok(tables)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    async fn store() -> Store {
        Store::open(StoreConfig::in_memory()).await.unwrap()
    }

    fn lines() -> Vec<OrderLine> {
        vec![
            OrderLine {
                item_id: 1,
                name: "Garlic Naan".to_string(),
                qty: 2,
                unit_price_paise: 6_000,
            },
            OrderLine {
                item_id: 2,
                name: "Dal Makhani".to_string(),
                qty: 1,
                unit_price_paise: 18_000,
            },
        ]
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let store = store().await;
        store.orders().save(3, &lines()).await.unwrap();

        let order = store.orders().get(3).await.unwrap().expect("occupied");
        assert_eq!(order.table_no, 3);
        assert_eq!(order.lines, lines());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_cart() {
        let store = store().await;
        store.orders().save(3, &lines()).await.unwrap();

        let smaller = vec![lines().remove(0)];
        store.orders().save(3, &smaller).await.unwrap();

        let order = store.orders().get(3).await.unwrap().unwrap();
        assert_eq!(order.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_save_clears_table() {
        let store = store().await;
        store.orders().save(5, &lines()).await.unwrap();
        store.orders().save(5, &[]).await.unwrap();
        assert!(store.orders().get(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_nonpositive_table() {
        let store = store().await;
        let err = store.orders().save(0, &lines()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_tables_statuses() {
        let store = store().await;
        store.orders().save(2, &lines()).await.unwrap();

        let tables = store.orders().list_tables(4).await.unwrap();
        assert_eq!(tables.len(), 4);
        assert_eq!(tables[0].status, TableStatus::Available);
        assert_eq!(tables[1].status, TableStatus::Occupied);
        assert_eq!(tables[1].order.len(), 2);
        assert!(tables[1].order[0].name.contains("Naan"));
        assert_eq!(tables[2].status, TableStatus::Available);
    }
}
