//! # Demo Catalog Seeding
//!
//! Populates a fresh store (zero items) with a realistic sample catalog and
//! a month of historical bills, so dashboards and reports have something to
//! show on first launch.
//!
//! Values are derived from index arithmetic, not an RNG: the shape is
//! deterministic across runs, which keeps this purely a developer
//! convenience and never a source of flaky behavior.

use chrono::{Duration, Utc};
use tracing::info;

use dukaan_core::{FulfillmentType, InvoiceConfig, Mode, PaymentMethod};

use crate::error::{DbError, DbResult};
use crate::pool::Store;

/// Restaurant menu: categories with their base dishes.
const RESTAURANT_CATALOG: &[(&str, &[&str])] = &[
    (
        "Starters",
        &[
            "Spring Rolls",
            "Garlic Bread",
            "Tomato Soup",
            "Bruschetta",
            "Nachos",
            "Chicken Wings",
            "Paneer Tikka",
            "Hara Bhara Kabab",
            "Corn Cheese Balls",
            "Fish Fingers",
        ],
    ),
    (
        "Main Course",
        &[
            "Paneer Butter Masala",
            "Chicken Curry",
            "Veg Biryani",
            "Chicken Biryani",
            "Dal Makhani",
            "Kadai Paneer",
            "Butter Chicken",
            "Pasta Alfredo",
            "Veg Pizza",
            "Chicken Pizza",
            "Grilled Sandwich",
            "Burger",
            "Fried Rice",
            "Hakka Noodles",
            "Manchurian",
        ],
    ),
    (
        "Breads",
        &[
            "Roti",
            "Naan",
            "Butter Naan",
            "Garlic Naan",
            "Paratha",
            "Kulcha",
            "Missi Roti",
        ],
    ),
    (
        "Beverages",
        &[
            "Coke",
            "Pepsi",
            "Sprite",
            "Fanta",
            "Fresh Lime Soda",
            "Cold Coffee",
            "Hot Coffee",
            "Masala Chai",
            "Iced Tea",
            "Mojito",
            "Oreo Shake",
            "Mango Lassi",
            "Water Bottle",
        ],
    ),
    (
        "Desserts",
        &[
            "Vanilla Ice Cream",
            "Chocolate Brownie",
            "Gulab Jamun",
            "Rasmalai",
            "Cheesecake",
            "Fruit Salad",
        ],
    ),
];

/// Grocery shelf: categories with their base products.
const GROCERY_CATALOG: &[(&str, &[&str])] = &[
    (
        "Staples",
        &[
            "Basmati Rice 5kg",
            "Toor Dal 1kg",
            "Moong Dal 1kg",
            "Wheat Atta 10kg",
            "Sugar 1kg",
            "Iodized Salt 1kg",
            "Sunflower Oil 1L",
            "Mustard Oil 1L",
            "Poha 500g",
            "Rava 500g",
        ],
    ),
    (
        "Snacks",
        &[
            "Potato Chips",
            "Namkeen Mix",
            "Salted Peanuts",
            "Glucose Biscuits",
            "Cream Biscuits",
            "Rusk Toast",
            "Instant Noodles",
            "Chocolate Bar",
            "Murukku",
            "Banana Chips",
        ],
    ),
    (
        "Beverages",
        &[
            "Tea Powder 250g",
            "Coffee Powder 100g",
            "Mango Juice 1L",
            "Cola 750ml",
            "Soda 600ml",
            "Energy Drink",
            "Coconut Water",
            "Buttermilk 500ml",
        ],
    ),
    (
        "Dairy",
        &[
            "Milk 500ml",
            "Curd 400g",
            "Paneer 200g",
            "Butter 100g",
            "Ghee 500ml",
            "Cheese Slices",
        ],
    ),
    (
        "Household",
        &[
            "Detergent 1kg",
            "Dish Soap Bar",
            "Floor Cleaner 1L",
            "Toilet Cleaner",
            "Agarbatti Pack",
            "Matchbox Pack",
            "Broom",
        ],
    ),
];

/// Dishes that also come in larger/special variants.
const VARIANT_KEYWORDS: &[&str] = &["Pizza", "Burger", "Pasta", "Biryani", "Curry", "Shake"];

const SAMPLE_CUSTOMERS: &[&str] = &["Walk-in", "Rahul", "Priya", "Amit", "Sneha", "Vikram"];

const MIN_ITEMS: usize = 105;
const SAMPLE_BILLS: usize = 50;

/// Everything needed to insert one catalog item.
struct ItemSpec {
    name: String,
    category: String,
    price_paise: i64,
    product_code: i64,
    stock: i64,
    tax_rate_bps: u32,
    is_favorite: bool,
    expiry_days: Option<i64>,
    description: String,
}

/// Derives a full item spec from its name, category, and running index.
fn make_spec(name: String, category: &str, mode: Mode, seed: usize) -> ItemSpec {
    ItemSpec {
        description: match mode {
            Mode::Restaurant => format!("Delicious {name}"),
            Mode::Grocery => String::new(),
        },
        price_paise: 5_000 + (seed as i64 * 37) % 30_000,
        // 7919 is coprime with 900000, so codes stay distinct.
        product_code: 100_000 + (seed as i64 * 7_919) % 900_000,
        stock: 40 + (seed as i64 * 11) % 80,
        tax_rate_bps: match mode {
            Mode::Restaurant => 500,
            Mode::Grocery => [0u32, 500, 1_200, 1_800][seed % 4],
        },
        is_favorite: seed % 7 == 0,
        expiry_days: match (mode, category) {
            (Mode::Grocery, "Dairy") => Some(5 + (seed as i64 * 3) % 45),
            (Mode::Grocery, "Snacks") => Some(30 + (seed as i64 * 5) % 150),
            _ => None,
        },
        name,
        category: category.to_string(),
    }
}

/// Seeds the demo catalog and history if the item table is empty.
/// A store that has ever held an item is left untouched.
pub(crate) async fn seed_if_empty(store: &Store, mode: Mode) -> DbResult<()> {
    let existing = store.items().count().await?;
    if existing > 0 {
        return Ok(());
    }

    info!(%mode, "Fresh store, seeding demo catalog");

    let catalog = match mode {
        Mode::Restaurant => RESTAURANT_CATALOG,
        Mode::Grocery => GROCERY_CATALOG,
    };

    // Build the item list: base entries plus large/special variants for the
    // usual suspects, padded to a full-looking catalog.
    let mut specs: Vec<ItemSpec> = Vec::new();
    let mut seed = 0usize;
    for (category, base_names) in catalog {
        for base in *base_names {
            specs.push(make_spec(base.to_string(), category, mode, seed));
            seed += 1;

            if VARIANT_KEYWORDS.iter().any(|k| base.contains(k)) {
                let mut large = make_spec(format!("{base} (Large)"), category, mode, seed);
                large.price_paise = large.price_paise * 3 / 2;
                large.description = "Large portion".to_string();
                specs.push(large);
                seed += 1;

                let mut special = make_spec(format!("{base} (Special)"), category, mode, seed);
                special.price_paise += 5_000;
                special.description = format!("Chef's special {base}");
                specs.push(special);
                seed += 1;
            }
        }
    }

    let mut extra = 1;
    while specs.len() < MIN_ITEMS {
        specs.push(make_spec(format!("Extra Item {extra}"), "Others", mode, seed));
        seed += 1;
        extra += 1;
    }

    let mut tx = store.pool().begin().await?;
    let now = Utc::now();
    let today = now.date_naive();
    let mut names: Vec<String> = Vec::with_capacity(specs.len());

    for spec in &specs {
        sqlx::query(
            "INSERT INTO items (name, price_paise, tax_rate_bps, category, stock, active, \
             is_favorite, product_code, mrp_paise, wholesale_paise, description, expiry_date, \
             created_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&spec.name)
        .bind(spec.price_paise)
        .bind(spec.tax_rate_bps)
        .bind(&spec.category)
        .bind(spec.stock)
        .bind(spec.is_favorite)
        .bind(spec.product_code)
        .bind(spec.price_paise + 2_000)
        .bind((spec.price_paise - 2_000).max(0))
        .bind(&spec.description)
        .bind(spec.expiry_days.map(|d| today + Duration::days(d)))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        names.push(spec.name.clone());
    }

    // A month of plausible history so dashboards aren't empty.
    let snapshot = serde_json::to_string(&InvoiceConfig::default())
        .map_err(|e| DbError::Internal(format!("seed snapshot: {e}")))?;
    let methods = [PaymentMethod::Cash, PaymentMethod::Upi, PaymentMethod::Card];

    for i in 0..SAMPLE_BILLS {
        let days_ago = (i * 13) % 30;
        let created_at =
            now - Duration::days(days_ago as i64) - Duration::minutes((i * 29) as i64 % 600);

        let line_count = 1 + i % 5;
        let mut total_paise = 0i64;
        let mut lines = Vec::with_capacity(line_count);
        for j in 0..line_count {
            let name = &names[(i * 3 + j * 5) % names.len()];
            let qty = 1 + ((i + j) % 3) as i64;
            let unit_price_paise = 4_000 + ((i * 31 + j * 17) as i64 % 25_000);
            total_paise += qty * unit_price_paise;
            lines.push((name.clone(), qty, unit_price_paise));
        }

        let (fulfillment, table_no) = match mode {
            Mode::Restaurant if i % 2 == 0 => (FulfillmentType::DineIn, Some((i as i64 % 10) + 1)),
            _ => (FulfillmentType::TakeAway, None),
        };

        let result = sqlx::query(
            "INSERT INTO bills (total_paise, fulfillment, table_no, payment_method, \
             cash_received_paise, change_due_paise, billed_by, customer_name, customer_phone, \
             invoice_config_snapshot, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(total_paise)
        .bind(fulfillment)
        .bind(table_no)
        .bind(methods[i % methods.len()])
        .bind(total_paise)
        .bind(0i64)
        .bind("cashier")
        .bind(SAMPLE_CUSTOMERS[i % SAMPLE_CUSTOMERS.len()])
        .bind(Option::<String>::None)
        .bind(&snapshot)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
        let bill_id = result.last_insert_rowid();

        for (name, qty, unit_price_paise) in lines {
            sqlx::query(
                "INSERT INTO bill_lines (bill_id, item_name, qty, unit_price_paise, \
                 tax_rate_bps, mrp_paise) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(bill_id)
            .bind(&name)
            .bind(qty)
            .bind(unit_price_paise)
            .bind(500u32)
            .bind(Option::<i64>::None)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    info!(items = specs.len(), bills = SAMPLE_BILLS, "Demo data seeded");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::StoreConfig;

    #[tokio::test]
    async fn test_seeds_only_once() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        seed_if_empty(&store, Mode::Grocery).await.unwrap();
        let first = store.items().count().await.unwrap();
        assert!(first >= MIN_ITEMS as i64);

        seed_if_empty(&store, Mode::Grocery).await.unwrap();
        assert_eq!(store.items().count().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_seeded_bills_span_history() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        seed_if_empty(&store, Mode::Restaurant).await.unwrap();

        let bills = store
            .billing()
            .list_bills(&Default::default())
            .await
            .unwrap();
        // Listing caps at 100; we seed 50.
        assert_eq!(bills.len(), SAMPLE_BILLS);

        // Product codes are distinct across the catalog.
        let items = store.items().list_active().await.unwrap();
        let mut codes: Vec<i64> = items.iter().map(|i| i.product_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), items.len());
    }
}
