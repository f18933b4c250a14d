//! # Billing Transaction Service
//!
//! Converts a cart into a durable bill with correct stock effects. Nothing
//! else mutates stock for a sale.
//!
//! ## The Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  finalize_sale(cart, payment, context)                              │
//! │                                                                     │
//! │  0. validate cart shape (no storage touched yet)                    │
//! │  1. take the store write lock ─────────┐ serializes concurrent      │
//! │  2. BEGIN                              │ sales per store            │
//! │  3. read stock for all cart ids        │                            │
//! │     (one query)                        │                            │
//! │  4. validate: exists+active, qty ≤ stock. ANY failure aborts the   │
//! │     whole sale, nothing decremented                                 │
//! │  5. conditional decrement per item:                                 │
//! │       UPDATE items SET stock = stock - ? WHERE id = ? AND stock ≥ ? │
//! │     zero affected rows ⇒ rollback (second line of defense)          │
//! │  6. freeze invoice_config as JSON onto the bill                     │
//! │  7. INSERT bill, INSERT one bill_line per cart line (copies, not    │
//! │     references)                                                     │
//! │  8. DINE_IN + table? DELETE that table's active order               │
//! │  9. COMMIT → { bill_id, total }                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Returning early anywhere after step 2 drops the transaction, which rolls
//! every decrement back. For two concurrent sales over the same item, the
//! write lock guarantees the loser re-reads post-commit stock and fails
//! validation honestly instead of double-decrementing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use dukaan_core::{
    validation, Bill, BillLine, BillReceipt, CartLine, CoreError, FulfillmentType, InvoiceConfig,
    PaymentInfo, PaymentMethod, SaleContext,
};

use crate::error::{DbError, DbResult};

/// Stock view of one cart item, read inside the sale transaction.
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: i64,
    name: String,
    stock: i64,
}

/// Filter for the bill history listing.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub fulfillment: Option<FulfillmentType>,
}

/// Service for the sale transaction and bill history reads.
#[derive(Debug, Clone)]
pub struct BillingService {
    pool: SqlitePool,
    /// Shared with every clone of the owning store; serializes sales.
    write_lock: Arc<Mutex<()>>,
}

impl BillingService {
    pub fn new(pool: SqlitePool, write_lock: Arc<Mutex<()>>) -> Self {
        BillingService { pool, write_lock }
    }

    /// Finalizes a sale. See the module docs for the exact sequence.
    ///
    /// ## Errors
    /// - `CoreError::Validation` - malformed cart, rejected before storage
    /// - `CoreError::ItemNotFound` - cart id unknown or inactive
    /// - `CoreError::InsufficientStock` - names the offending item
    /// - `DbError::*` - storage failure; the caller must assume nothing
    ///   was written
    pub async fn finalize_sale(
        &self,
        cart: &[CartLine],
        payment: &PaymentInfo,
        context: &SaleContext,
    ) -> DbResult<BillReceipt> {
        validation::validate_cart(cart).map_err(CoreError::from)?;

        // Single writer per store: between the stock read below and the
        // commit, no other sale can touch this store.
        let _write = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        // One read for every distinct item referenced by the cart. The cart
        // may repeat an id; quantities are summed before validation.
        let mut requested: HashMap<i64, i64> = HashMap::new();
        for line in cart {
            *requested.entry(line.item_id).or_insert(0) += line.qty;
        }

        let ids: Vec<i64> = requested.keys().copied().collect();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let stock_sql = format!(
            "SELECT id, name, stock FROM items WHERE active = 1 AND id IN ({placeholders})"
        );
        let mut query = sqlx::query_as::<_, StockRow>(&stock_sql);
        for id in &ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&mut *tx).await?;
        let stock_by_id: HashMap<i64, StockRow> =
            rows.into_iter().map(|r| (r.id, r)).collect();

        // All-or-nothing validation: the first failure aborts the sale with
        // no stock mutated (the transaction has not written anything yet).
        for line in cart {
            let row = stock_by_id
                .get(&line.item_id)
                .ok_or_else(|| CoreError::ItemNotFound(line.name.clone()))?;
            let want = requested[&line.item_id];
            if want > row.stock {
                return Err(CoreError::InsufficientStock {
                    name: row.name.clone(),
                    available: row.stock,
                    requested: want,
                }
                .into());
            }
        }

        // Conditional decrements. The validation above already passed, so a
        // zero-row update means the guard caught something validation could
        // not see; dropping the transaction rolls earlier decrements back.
        for (&id, &qty) in &requested {
            let result = sqlx::query(
                "UPDATE items SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
            )
            .bind(qty)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let row = &stock_by_id[&id];
                return Err(CoreError::InsufficientStock {
                    name: row.name.clone(),
                    available: row.stock,
                    requested: qty,
                }
                .into());
            }
        }

        // Freeze the invoice configuration as it is right now. Receipts for
        // this bill render from this blob forever.
        let invoice: InvoiceConfig = sqlx::query_as(
            "SELECT heading, company_name, address, gst_number, fssai_id, show_watermark, \
             force_bold FROM invoice_config WHERE id = 1",
        )
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or_default();
        let snapshot = serde_json::to_string(&invoice)
            .map_err(|e| DbError::Internal(format!("snapshot serialization: {e}")))?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO bills (total_paise, fulfillment, table_no, payment_method, \
             cash_received_paise, change_due_paise, billed_by, customer_name, customer_phone, \
             invoice_config_snapshot, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(context.total_paise)
        .bind(context.fulfillment)
        .bind(context.table_no)
        .bind(payment.method)
        .bind(payment.cash_received_paise)
        .bind(payment.change_due_paise)
        .bind(&context.billed_by)
        .bind(&context.customer_name)
        .bind(&context.customer_phone)
        .bind(&snapshot)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let bill_id = result.last_insert_rowid();

        for line in cart {
            sqlx::query(
                "INSERT INTO bill_lines (bill_id, item_name, qty, unit_price_paise, \
                 tax_rate_bps, mrp_paise) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(bill_id)
            .bind(&line.name)
            .bind(line.qty)
            .bind(line.unit_price_paise)
            .bind(line.tax_rate_bps)
            .bind(line.mrp_paise)
            .execute(&mut *tx)
            .await?;
        }

        // A paid table is a free table.
        if context.fulfillment == FulfillmentType::DineIn {
            if let Some(table_no) = context.table_no {
                sqlx::query("DELETE FROM active_orders WHERE table_no = ?1")
                    .bind(table_no)
                    .execute(&mut *tx)
                    .await?;
                debug!(table_no, "Cleared active order on finalize");
            }
        }

        tx.commit().await?;

        info!(
            bill_id,
            total = context.total_paise,
            lines = cart.len(),
            billed_by = %context.billed_by,
            "Sale finalized"
        );

        Ok(BillReceipt {
            bill_id,
            total_paise: context.total_paise,
        })
    }

    /// Fetches one bill with its lines and frozen snapshot.
    pub async fn get_bill(&self, id: i64) -> DbResult<Option<(Bill, Vec<BillLine>)>> {
        let bill = sqlx::query_as::<_, Bill>(
            "SELECT id, total_paise, fulfillment, table_no, payment_method, \
             cash_received_paise, change_due_paise, billed_by, customer_name, customer_phone, \
             invoice_config_snapshot, created_at FROM bills WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(bill) = bill else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, BillLine>(
            "SELECT id, bill_id, item_name, qty, unit_price_paise, tax_rate_bps, mrp_paise \
             FROM bill_lines WHERE bill_id = ?1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((bill, lines)))
    }

    /// Lists recent bills, newest first, capped at 100 rows.
    pub async fn list_bills(&self, filter: &BillFilter) -> DbResult<Vec<Bill>> {
        let mut sql = String::from(
            "SELECT id, total_paise, fulfillment, table_no, payment_method, \
             cash_received_paise, change_due_paise, billed_by, customer_name, customer_phone, \
             invoice_config_snapshot, created_at FROM bills WHERE 1=1",
        );
        if filter.start_date.is_some() {
            sql.push_str(" AND DATE(created_at) >= DATE(?)");
        }
        if filter.end_date.is_some() {
            sql.push_str(" AND DATE(created_at) <= DATE(?)");
        }
        if filter.payment_method.is_some() {
            sql.push_str(" AND payment_method = ?");
        }
        if filter.fulfillment.is_some() {
            sql.push_str(" AND fulfillment = ?");
        }
        sql.push_str(" ORDER BY id DESC LIMIT 100");

        let mut query = sqlx::query_as::<_, Bill>(&sql);
        if let Some(start) = filter.start_date {
            query = query.bind(start);
        }
        if let Some(end) = filter.end_date {
            query = query.bind(end);
        }
        if let Some(method) = filter.payment_method {
            query = query.bind(method);
        }
        if let Some(fulfillment) = filter.fulfillment {
            query = query.bind(fulfillment);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use crate::repository::item::NewItem;

    async fn store() -> Store {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        store
            .configs()
            .ensure_defaults(dukaan_core::Mode::Restaurant)
            .await
            .unwrap();
        store
    }

    async fn seeded_item(store: &Store, name: &str, stock: i64) -> dukaan_core::Item {
        store
            .items()
            .insert(NewItem {
                name: name.to_string(),
                price_paise: 10_000,
                tax_rate_bps: 500,
                category: "Main Course".to_string(),
                stock,
                mrp_paise: None,
                wholesale_paise: None,
                description: String::new(),
                expiry_date: None,
                product_code: None,
            })
            .await
            .unwrap()
    }

    fn cart_line(item: &dukaan_core::Item, qty: i64) -> CartLine {
        CartLine {
            item_id: item.id,
            name: item.name.clone(),
            qty,
            unit_price_paise: item.price_paise,
            tax_rate_bps: item.tax_rate_bps,
            mrp_paise: item.mrp_paise,
        }
    }

    fn cash_payment() -> PaymentInfo {
        PaymentInfo {
            method: PaymentMethod::Cash,
            cash_received_paise: 50_000,
            change_due_paise: 20_000,
        }
    }

    fn take_away(total_paise: i64) -> SaleContext {
        SaleContext {
            fulfillment: FulfillmentType::TakeAway,
            table_no: None,
            billed_by: "cashier".to_string(),
            customer_name: None,
            customer_phone: None,
            total_paise,
        }
    }

    #[tokio::test]
    async fn test_successful_sale_decrements_stock() {
        let store = store().await;
        let item = seeded_item(&store, "Veg Biryani", 5).await;

        let receipt = store
            .billing()
            .finalize_sale(&[cart_line(&item, 3)], &cash_payment(), &take_away(30_000))
            .await
            .unwrap();

        assert_eq!(receipt.total_paise, 30_000);

        // Stock 5 - 3 = 2.
        let after = store.items().get(item.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 2);

        // Exactly one bill with one line.
        let (bill, lines) = store
            .billing()
            .get_bill(receipt.bill_id)
            .await
            .unwrap()
            .expect("bill exists");
        assert_eq!(bill.total_paise, 30_000);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_name, "Veg Biryani");
        assert_eq!(lines[0].qty, 3);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejects_whole_sale() {
        let store = store().await;
        let item = seeded_item(&store, "Paneer Tikka", 2).await;

        let err = store
            .billing()
            .finalize_sale(&[cart_line(&item, 3)], &cash_payment(), &take_away(30_000))
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Paneer Tikka");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Nothing written: stock unchanged, no bill.
        let after = store.items().get(item.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 2);
        assert!(store.billing().list_bills(&BillFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_is_atomic() {
        let store = store().await;
        let good = seeded_item(&store, "Roti", 50).await;
        let scarce = seeded_item(&store, "Butter Naan", 1).await;

        // First line alone would succeed; second line kills the whole cart.
        let err = store
            .billing()
            .finalize_sale(
                &[cart_line(&good, 10), cart_line(&scarce, 2)],
                &cash_payment(),
                &take_away(12_000),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));

        // No partial decrement on the good line.
        assert_eq!(store.items().get(good.id).await.unwrap().unwrap().stock, 50);
        assert_eq!(store.items().get(scarce.id).await.unwrap().unwrap().stock, 1);
        assert!(store.billing().list_bills(&BillFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_item_fails_with_name() {
        let store = store().await;

        let ghost = CartLine {
            item_id: 404,
            name: "Phantom Dosa".to_string(),
            qty: 1,
            unit_price_paise: 9_000,
            tax_rate_bps: 500,
            mrp_paise: None,
        };

        let err = store
            .billing()
            .finalize_sale(&[ghost], &cash_payment(), &take_away(9_000))
            .await
            .unwrap_err();
        match err {
            DbError::Domain(CoreError::ItemNotFound(name)) => {
                assert_eq!(name, "Phantom Dosa")
            }
            other => panic!("expected ItemNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inactive_item_is_not_found() {
        let store = store().await;
        let item = seeded_item(&store, "Seasonal Special", 10).await;
        store.items().set_active(item.id, false).await.unwrap();

        let err = store
            .billing()
            .finalize_sale(&[cart_line(&item, 1)], &cash_payment(), &take_away(10_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_storage() {
        let store = store().await;
        let err = store
            .billing()
            .finalize_sale(&[], &cash_payment(), &take_away(0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_repeated_item_quantities_are_summed() {
        let store = store().await;
        let item = seeded_item(&store, "Masala Chai", 5).await;

        // 3 + 3 across two lines exceeds stock 5 even though each line fits.
        let err = store
            .billing()
            .finalize_sale(
                &[cart_line(&item, 3), cart_line(&item, 3)],
                &cash_payment(),
                &take_away(60_000),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { requested: 6, .. })
        ));
        assert_eq!(store.items().get(item.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_concurrent_sales_exactly_one_wins() {
        // Item{stock=5}; two concurrent sales of qty=3: exactly one commits,
        // the loser observes the post-commit stock and fails honestly.
        let store = store().await;
        let item = seeded_item(&store, "Chicken Biryani", 5).await;

        let s1 = store.clone();
        let s2 = store.clone();
        let line1 = cart_line(&item, 3);
        let line2 = cart_line(&item, 3);

        let (r1, r2) = tokio::join!(
            async move {
                s1.billing()
                    .finalize_sale(&[line1], &cash_payment(), &take_away(30_000))
                    .await
            },
            async move {
                s2.billing()
                    .finalize_sale(&[line2], &cash_payment(), &take_away(30_000))
                    .await
            }
        );

        let successes = [r1.is_ok(), r2.is_ok()].iter().filter(|&&ok| ok).count();
        assert_eq!(successes, 1, "exactly one of the two sales must win");

        let loser = if r1.is_err() { r1.unwrap_err() } else { r2.unwrap_err() };
        assert!(matches!(
            loser,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));

        let after = store.items().get(item.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 2);
    }

    #[tokio::test]
    async fn test_snapshot_is_frozen_against_config_edits() {
        let store = store().await;
        let item = seeded_item(&store, "Thali", 10).await;

        let mut invoice = store.configs().invoice().await.unwrap();
        invoice.company_name = "Old Name Pvt Ltd".to_string();
        store.configs().set_invoice(&invoice).await.unwrap();

        let receipt = store
            .billing()
            .finalize_sale(&[cart_line(&item, 1)], &cash_payment(), &take_away(10_000))
            .await
            .unwrap();

        // Edit the config after the sale.
        invoice.company_name = "New Name Pvt Ltd".to_string();
        invoice.address = "12 MG Road".to_string();
        store.configs().set_invoice(&invoice).await.unwrap();

        let (bill, _) = store
            .billing()
            .get_bill(receipt.bill_id)
            .await
            .unwrap()
            .unwrap();
        let frozen: InvoiceConfig = serde_json::from_str(&bill.invoice_config_snapshot).unwrap();
        assert_eq!(frozen.company_name, "Old Name Pvt Ltd");
        assert_eq!(frozen.address, "");
    }

    #[tokio::test]
    async fn test_dine_in_finalize_clears_table() {
        let store = store().await;
        let item = seeded_item(&store, "Dal Makhani", 10).await;

        // Park an order on table 4.
        store
            .orders()
            .save(
                4,
                &[dukaan_core::OrderLine {
                    item_id: item.id,
                    name: item.name.clone(),
                    qty: 2,
                    unit_price_paise: item.price_paise,
                }],
            )
            .await
            .unwrap();
        assert!(store.orders().get(4).await.unwrap().is_some());

        let context = SaleContext {
            fulfillment: FulfillmentType::DineIn,
            table_no: Some(4),
            billed_by: "cashier".to_string(),
            customer_name: Some("Priya".to_string()),
            customer_phone: None,
            total_paise: 20_000,
        };
        store
            .billing()
            .finalize_sale(&[cart_line(&item, 2)], &cash_payment(), &context)
            .await
            .unwrap();

        // Table 4 is free again.
        assert!(store.orders().get(4).await.unwrap().is_none());
        let tables = store.orders().list_tables(10).await.unwrap();
        let table4 = tables.iter().find(|t| t.id == 4).unwrap();
        assert_eq!(table4.status, dukaan_core::TableStatus::Available);
    }

    #[tokio::test]
    async fn test_bill_filter_by_payment_method() {
        let store = store().await;
        let item = seeded_item(&store, "Filter Coffee", 50).await;

        for method in [PaymentMethod::Cash, PaymentMethod::Upi, PaymentMethod::Cash] {
            let payment = PaymentInfo {
                method,
                cash_received_paise: 10_000,
                change_due_paise: 0,
            };
            store
                .billing()
                .finalize_sale(&[cart_line(&item, 1)], &payment, &take_away(10_000))
                .await
                .unwrap();
        }

        let cash_only = store
            .billing()
            .list_bills(&BillFilter {
                payment_method: Some(PaymentMethod::Cash),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cash_only.len(), 2);

        let all = store.billing().list_bills(&BillFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first.
        assert!(all[0].id > all[1].id);
    }
}
