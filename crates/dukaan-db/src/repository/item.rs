//! # Item Repository
//!
//! Catalog CRUD for one business-mode store.
//!
//! ## Key Rules
//! - Items are soft-deleted: "removal" sets `active = 0`
//! - Every item carries a scannable 6-digit product code; one is generated
//!   when the caller doesn't supply it
//! - Stock is only ever mutated here (manual adjustments, with audit) or by
//!   the billing transaction (sale decrements)

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use dukaan_core::{validation, CoreError, Item, ValidationError};

use crate::error::{DbError, DbResult};

/// Columns of a full item row, shared by every SELECT below.
const ITEM_COLUMNS: &str = "id, name, price_paise, tax_rate_bps, category, stock, active, \
     is_favorite, product_code, mrp_paise, wholesale_paise, description, expiry_date, created_at";

/// Payload for creating an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub price_paise: i64,
    pub tax_rate_bps: u32,
    pub category: String,
    pub stock: i64,
    pub mrp_paise: Option<i64>,
    pub wholesale_paise: Option<i64>,
    pub description: String,
    pub expiry_date: Option<NaiveDate>,
    /// Scannable code; generated when absent.
    pub product_code: Option<i64>,
}

/// Payload for editing an item. The active flag is toggled separately.
#[derive(Debug, Clone)]
pub struct UpdateItem {
    pub id: i64,
    pub name: String,
    pub price_paise: i64,
    pub tax_rate_bps: u32,
    pub category: String,
    pub stock: i64,
    pub mrp_paise: Option<i64>,
    pub wholesale_paise: Option<i64>,
    pub description: String,
    pub expiry_date: Option<NaiveDate>,
}

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists active items, grouped by category for the billing screen.
    pub async fn list_active(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE active = 1 ORDER BY category, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an item by id (active or not).
    pub async fn get(&self, id: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Barcode lookup: finds an active item by its product code.
    pub async fn find_by_product_code(&self, code: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE product_code = ?1 AND active = 1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Total number of items (including inactive).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Creates an item, generating a product code when none is supplied.
    pub async fn insert(&self, new: NewItem) -> DbResult<Item> {
        validation::validate_item_name(&new.name).map_err(CoreError::from)?;
        validation::validate_price_paise(new.price_paise).map_err(CoreError::from)?;
        validation::validate_tax_rate_bps(new.tax_rate_bps).map_err(CoreError::from)?;

        let product_code = new.product_code.unwrap_or_else(generate_product_code);
        let now = Utc::now();

        debug!(name = %new.name, product_code, "Inserting item");

        let result = sqlx::query(
            "INSERT INTO items (name, price_paise, tax_rate_bps, category, stock, active, \
             is_favorite, product_code, mrp_paise, wholesale_paise, description, expiry_date, \
             created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 1, 0, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&new.name)
        .bind(new.price_paise)
        .bind(new.tax_rate_bps)
        .bind(&new.category)
        .bind(new.stock)
        .bind(product_code)
        .bind(new.mrp_paise)
        .bind(new.wholesale_paise)
        .bind(&new.description)
        .bind(new.expiry_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Edits an item's catalog fields.
    ///
    /// Historical bill lines are unaffected: they carry their own copies of
    /// name/price/tax.
    pub async fn update(&self, update: UpdateItem) -> DbResult<()> {
        validation::validate_item_name(&update.name).map_err(CoreError::from)?;
        validation::validate_price_paise(update.price_paise).map_err(CoreError::from)?;
        validation::validate_tax_rate_bps(update.tax_rate_bps).map_err(CoreError::from)?;

        let result = sqlx::query(
            "UPDATE items SET name = ?2, price_paise = ?3, tax_rate_bps = ?4, category = ?5, \
             stock = ?6, mrp_paise = ?7, wholesale_paise = ?8, description = ?9, \
             expiry_date = ?10 WHERE id = ?1",
        )
        .bind(update.id)
        .bind(&update.name)
        .bind(update.price_paise)
        .bind(update.tax_rate_bps)
        .bind(&update.category)
        .bind(update.stock)
        .bind(update.mrp_paise)
        .bind(update.wholesale_paise)
        .bind(&update.description)
        .bind(update.expiry_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", update.id));
        }

        Ok(())
    }

    /// Soft-deletes or restores an item.
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE items SET active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Pins or unpins an item on the billing screen.
    pub async fn set_favorite(&self, id: i64, favorite: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE items SET is_favorite = ?2 WHERE id = ?1")
            .bind(id)
            .bind(favorite)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Sets an item's stock to an absolute value, recording the change in
    /// the stock history.
    ///
    /// The audit write is best-effort: its failure is logged and does not
    /// roll back the stock update.
    pub async fn set_stock(&self, id: i64, new_stock: i64, changed_by: &str) -> DbResult<()> {
        if new_stock < 0 {
            return Err(CoreError::Validation(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            })
            .into());
        }

        let item = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))?;

        sqlx::query("UPDATE items SET stock = ?2 WHERE id = ?1")
            .bind(id)
            .bind(new_stock)
            .execute(&self.pool)
            .await?;

        debug!(id, old = item.stock, new = new_stock, by = changed_by, "Stock adjusted");

        let audit = sqlx::query(
            "INSERT INTO stock_history (item_id, item_name, old_stock, new_stock, \
             change_amount, changed_by, changed_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(id)
        .bind(&item.name)
        .bind(item.stock)
        .bind(new_stock)
        .bind(new_stock - item.stock)
        .bind(changed_by)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = audit {
            warn!(id, error = %e, "Stock history write failed; stock update stands");
        }

        Ok(())
    }

    /// Updates the wholesale price from the stock screen.
    pub async fn set_wholesale(&self, id: i64, wholesale_paise: Option<i64>) -> DbResult<()> {
        let result = sqlx::query("UPDATE items SET wholesale_paise = ?2 WHERE id = ?1")
            .bind(id)
            .bind(wholesale_paise)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Updates the description from the stock screen.
    pub async fn set_description(&self, id: i64, description: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE items SET description = ?2 WHERE id = ?1")
            .bind(id)
            .bind(description)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }
}

/// Generates a 6-digit scannable product code.
fn generate_product_code() -> i64 {
    100_000 + (Uuid::new_v4().as_u128() % 900_000) as i64
}

// =============================================================================
// Unit Tests
// =============================================================================
