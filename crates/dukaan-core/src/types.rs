//! # Domain Types
//!
//! Core domain types used throughout Dukaan POS.
//!
//! ## Two Universes
//! Every entity below (except [`Mode`] itself) lives inside exactly one
//! business-mode store. The RESTAURANT and GROCERY stores are fully
//! independent: switching modes never migrates or merges rows between them.
//!
//! ## Snapshot Pattern
//! [`BillLine`] and `Bill::invoice_config_snapshot` are point-in-time copies,
//! intentionally decoupled from the live catalog and settings so historical
//! bills never change under later edits.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Business Mode
// =============================================================================

/// The business type selecting which independent store is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Dine-in tables, active orders, kitchen-style catalog.
    Restaurant,
    /// Retail/grocery: barcode-driven, MRP and wholesale pricing.
    Grocery,
}

impl Mode {
    /// Wire/storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::Restaurant => "RESTAURANT",
            Mode::Grocery => "GROCERY",
        }
    }

    /// File name of the backing store for this mode.
    pub const fn store_file(&self) -> &'static str {
        match self {
            Mode::Restaurant => "restaurant.db",
            Mode::Grocery => "grocery.db",
        }
    }

    /// License feature flag that enables this mode.
    pub const fn required_feature(&self) -> &'static str {
        match self {
            Mode::Restaurant => "restaurant",
            Mode::Grocery => "retail",
        }
    }

    /// The other business mode.
    pub const fn other(&self) -> Mode {
        match self {
            Mode::Restaurant => Mode::Grocery,
            Mode::Grocery => Mode::Restaurant,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Restaurant
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RESTAURANT" => Ok(Mode::Restaurant),
            "GROCERY" => Ok(Mode::Grocery),
            other => Err(CoreError::InvalidMode(other.to_string())),
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// POS user role, governing authorization for mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full control: settings, users, mode switching.
    SuperAdmin,
    /// Day-to-day management: stock edits, catalog edits.
    Admin,
    /// Billing only.
    Cashier,
}

impl Role {
    /// Whether this role may mutate settings, users, and the business mode.
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Whether this role may adjust stock levels manually.
    pub const fn can_adjust_stock(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Cashier => "CASHIER",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Fulfillment & Payment
// =============================================================================

/// How a sale is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentType {
    /// Tied to a dine-in table; finalizing clears the table's active order.
    DineIn,
    /// Counter sale, no table involved.
    TakeAway,
}

impl FromStr for FulfillmentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DINE_IN" => Ok(FulfillmentType::DineIn),
            "TAKE_AWAY" => Ok(FulfillmentType::TakeAway),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "fulfillment type".to_string(),
                    reason: format!("unknown value '{other}'"),
                },
            )),
        }
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Card,
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "UPI" => Ok(PaymentMethod::Upi),
            "CARD" => Ok(PaymentMethod::Card),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "payment method".to_string(),
                    reason: format!("unknown value '{other}'"),
                },
            )),
        }
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 500 bps = 5% GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for the HTTP edge).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item available for sale.
///
/// Items are never hard-deleted; "removal" flips `active` to false so that
/// old bill lines keep meaning something.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Unit price in paise.
    pub price_paise: i64,

    /// Tax rate in basis points (500 = 5%).
    pub tax_rate_bps: u32,

    /// Category label ("Beverages", "Staples", ...).
    pub category: String,

    /// Current stock level. Invariant: never negative.
    pub stock: i64,

    /// Soft-delete flag.
    pub active: bool,

    /// Pinned on the billing screen.
    pub is_favorite: bool,

    /// Externally scannable numeric code (barcode lookup).
    pub product_code: i64,

    /// Maximum retail price in paise, if printed on the package.
    pub mrp_paise: Option<i64>,

    /// Wholesale/purchase price in paise.
    pub wholesale_paise: Option<i64>,

    pub description: String,

    /// Expiry date for perishables.
    pub expiry_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Whether `quantity` units can currently be sold.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.active && self.stock >= quantity
    }
}

// =============================================================================
// Bill & Bill Lines
// =============================================================================

/// A completed sale. Created exactly once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: i64,
    pub total_paise: i64,
    pub fulfillment: FulfillmentType,
    pub table_no: Option<i64>,
    pub payment_method: PaymentMethod,
    pub cash_received_paise: i64,
    pub change_due_paise: i64,
    /// Username of the cashier who rang the sale up.
    pub billed_by: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    /// Frozen JSON copy of [`InvoiceConfig`] at the moment of sale.
    ///
    /// Receipts re-render from this blob, never from the live config, so a
    /// later change of address/GST number cannot rewrite history.
    pub invoice_config_snapshot: String,
    pub created_at: DateTime<Utc>,
}

/// One line of a bill.
///
/// Name, price, tax rate and MRP are copied from the cart at finalize time,
/// not referenced from the live Item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillLine {
    pub id: i64,
    pub bill_id: i64,
    pub item_name: String,
    pub qty: i64,
    pub unit_price_paise: i64,
    pub tax_rate_bps: u32,
    pub mrp_paise: Option<i64>,
}

// =============================================================================
// Sale Inputs
// =============================================================================

/// One line of an incoming cart, as submitted for finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: i64,
    pub name: String,
    pub qty: i64,
    pub unit_price_paise: i64,
    pub tax_rate_bps: u32,
    pub mrp_paise: Option<i64>,
}

impl CartLine {
    /// Line total before tax.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.unit_price_paise * self.qty)
    }

    /// Tax amount for this line.
    #[inline]
    pub fn tax_amount(&self) -> Money {
        self.line_total().calculate_tax(TaxRate::from_bps(self.tax_rate_bps))
    }
}

/// Payment details accompanying a sale.
///
/// Any discount has already been applied into the sale total by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: PaymentMethod,
    pub cash_received_paise: i64,
    pub change_due_paise: i64,
}

/// Context for a sale: who, where, and the final total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleContext {
    pub fulfillment: FulfillmentType,
    pub table_no: Option<i64>,
    pub billed_by: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub total_paise: i64,
}

/// What the cashier gets back after a successful sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillReceipt {
    pub bill_id: i64,
    pub total_paise: i64,
}

// =============================================================================
// Active Orders (Dine-In)
// =============================================================================

/// One line of an unpaid, in-progress table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: i64,
    pub name: String,
    pub qty: i64,
    pub unit_price_paise: i64,
}

/// An unpaid, in-progress cart parked on a dine-in table.
///
/// Deleted when the table is cleared without paying, or as a side effect of
/// finalizing a DINE_IN sale for the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveOrder {
    pub table_no: i64,
    pub lines: Vec<OrderLine>,
    pub updated_at: DateTime<Utc>,
}

/// Occupancy state of a dine-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableStatus {
    Occupied,
    Available,
}

/// One entry of the table overview screen.
#[derive(Debug, Clone, Serialize)]
pub struct TableEntry {
    pub id: i64,
    pub status: TableStatus,
    pub order: Vec<OrderLine>,
}

// =============================================================================
// Configuration Singletons
// =============================================================================

/// Invoice presentation settings (singleton per store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceConfig {
    pub heading: String,
    pub company_name: String,
    pub address: String,
    pub gst_number: String,
    pub fssai_id: String,
    pub show_watermark: bool,
    pub force_bold: bool,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        InvoiceConfig {
            heading: "BILLING POS".to_string(),
            company_name: "Our Store".to_string(),
            address: String::new(),
            gst_number: String::new(),
            fssai_id: String::new(),
            show_watermark: true,
            force_bold: false,
        }
    }
}

/// Dine-in table count (singleton per store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TableConfig {
    pub total_tables: i64,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            total_tables: crate::DEFAULT_TOTAL_TABLES,
        }
    }
}

/// Time window for dashboard queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum TimeRange {
    #[serde(rename = "TODAY")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "TODAY"))]
    Today,
    #[serde(rename = "LAST_7_DAYS")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "LAST_7_DAYS"))]
    Last7Days,
    #[serde(rename = "LAST_30_DAYS")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "LAST_30_DAYS"))]
    Last30Days,
    #[serde(rename = "LAST_3_MONTHS")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "LAST_3_MONTHS"))]
    Last3Months,
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Last7Days
    }
}

/// Dashboard panel toggles (singleton per store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DashboardConfig {
    pub show_sales_trend: bool,
    pub show_revenue_breakdown: bool,
    pub show_top_items: bool,
    pub show_payment_methods: bool,
    pub show_stock_alerts: bool,
    pub default_time_range: TimeRange,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            show_sales_trend: true,
            show_revenue_breakdown: true,
            show_top_items: true,
            show_payment_methods: true,
            show_stock_alerts: true,
            default_time_range: TimeRange::Last7Days,
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// A POS user. Invariant: at least one SUPER_ADMIN always exists per store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, never the plaintext password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

// =============================================================================
// Audit Log Entries
// =============================================================================

/// Append-only record of a manual stock adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockChange {
    pub id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub old_stock: i64,
    pub new_stock: i64,
    pub change_amount: i64,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

/// What a login-history row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum LoginAction {
    Login,
    Logout,
}

/// Append-only record of a login or logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LoginEvent {
    pub id: i64,
    pub username: String,
    pub action: LoginAction,
    pub occurred_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
