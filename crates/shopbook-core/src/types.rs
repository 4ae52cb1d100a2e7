//! # Domain Types
//!
//! Core domain types used throughout Shopbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  Catalog:      Category ──► Product (SKU, price, stock)         │
//! │  Purchasing:   Vendor ──► Purchase (stock-in event)             │
//! │  Selling:      Customer ──► Sale ──► SaleItem (snapshots)       │
//! │  Obligations:  Expense, Sale (receivable side), Loan            │
//! │                      │                                          │
//! │                      └──► balance_cents + status (derived,      │
//! │                           never set directly — see finance)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (sku, invoice_number) - human-readable
//!
//! ## Derived Fields
//! `Expense`, `Sale`, and `Loan` each carry `balance_cents` and `status`
//! columns. These are caches of [`crate::finance::assess`] output, written
//! by `refresh_state` immediately before persistence and recomputed again
//! at render time. No other code path may assign them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::finance::{Obligation, PaymentStatus};
use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category (e.g. "Beverages", "Stationery").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique per shop.
    pub name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Category this product belongs to, if any.
    pub category_id: Option<String>,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown in lists and on invoices.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Selling price in cents (smallest currency unit).
    pub unit_price_cents: i64,

    /// Purchase cost in cents (for margin calculations).
    pub unit_cost_cents: Option<i64>,

    /// Current stock on hand. Purchases increment, sales decrement.
    pub stock_quantity: i64,

    /// Stock level at which the product counts as low stock.
    pub reorder_level: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the purchase cost as a Money type, if known.
    #[inline]
    pub fn unit_cost(&self) -> Option<Money> {
        self.unit_cost_cents.map(Money::from_cents)
    }

    /// Whether the stock on hand has fallen to or below the reorder level.
    pub fn is_low_stock(&self) -> bool {
        match self.reorder_level {
            Some(level) => self.stock_quantity <= level,
            None => false,
        }
    }

    /// Checks if the requested quantity can be sold from stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && self.stock_quantity >= quantity
    }
}

// =============================================================================
// Vendor & Customer
// =============================================================================

/// A supplier the shop buys stock from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A customer, tracked so credit sales have someone to collect from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A stock-in event: quantity of one product bought from a vendor.
///
/// Recording a purchase increments the product's stock in the same
/// transaction (see the purchase repository).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub vendor_id: String,
    pub product_id: String,
    /// Units bought.
    pub quantity: i64,
    /// Cost per unit in cents at time of purchase.
    pub unit_cost_cents: i64,
    /// Line total: unit cost × quantity.
    pub total_cents: i64,
    /// Vendor invoice/reference number, if any.
    pub reference: Option<String>,
    /// Calendar date the purchase was made.
    pub purchased_at: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Returns the purchase total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A customer sale. The receivable side of the sale (total vs. paid) is a
/// monetary obligation: `balance_cents` and `status` are derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,

    /// Human-readable invoice number, unique per shop.
    pub invoice_number: String,

    /// Customer the sale was made to. `None` for anonymous cash sales.
    pub customer_id: Option<String>,

    /// Calendar date of the sale.
    pub sale_date: NaiveDate,

    /// Total amount due for this sale (sum of line totals).
    pub total_cents: i64,

    /// Cumulative amount the customer has paid so far.
    pub amount_paid_cents: i64,

    /// When the outstanding balance is contractually due, for credit sales.
    pub due_date: Option<NaiveDate>,

    /// Derived: `total_cents - amount_paid_cents`. Never set directly.
    pub balance_cents: i64,

    /// Derived payment status. Never set directly.
    pub status: PaymentStatus,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Recomputes the derived `balance_cents`/`status` pair.
    ///
    /// Must be called immediately before persisting a sale whose
    /// `total_cents`, `amount_paid_cents`, or `due_date` changed.
    pub fn refresh_state(&mut self, as_of: DateTime<Utc>) {
        let state = self.financial_state(as_of);
        self.balance_cents = state.balance.cents();
        self.status = state.status;
    }
}

impl Obligation for Sale {
    fn amount_due(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total: unit price × quantity.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A bill the shop owes: rent, utilities, supplies.
///
/// `balance_cents` and `status` are derived fields, see [`crate::finance`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,

    /// Short title shown in lists ("March rent").
    pub title: String,

    /// Free-form expense category label ("rent", "utilities").
    pub category: Option<String>,

    /// Total amount owed in cents.
    pub amount_due_cents: i64,

    /// Cumulative amount paid so far in cents.
    pub amount_paid_cents: i64,

    /// When payment is contractually due, if a date was agreed.
    pub due_date: Option<NaiveDate>,

    /// Derived: `amount_due_cents - amount_paid_cents`. Never set directly.
    pub balance_cents: i64,

    /// Derived payment status. Never set directly.
    pub status: PaymentStatus,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Recomputes the derived `balance_cents`/`status` pair.
    ///
    /// Must be called immediately before persisting an expense whose
    /// amounts or due date changed.
    pub fn refresh_state(&mut self, as_of: DateTime<Utc>) {
        let state = self.financial_state(as_of);
        self.balance_cents = state.balance.cents();
        self.status = state.status;
    }
}

impl Obligation for Expense {
    fn amount_due(&self) -> Money {
        Money::from_cents(self.amount_due_cents)
    }

    fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

// =============================================================================
// Loan
// =============================================================================

/// Money borrowed by the shop, repaid over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Loan {
    pub id: String,

    /// Who the money was borrowed from.
    pub lender: String,

    /// Principal owed in cents.
    pub principal_cents: i64,

    /// Cumulative amount repaid so far in cents.
    pub repaid_cents: i64,

    /// When full repayment is due, if a date was agreed.
    pub due_date: Option<NaiveDate>,

    /// Derived: `principal_cents - repaid_cents`. Never set directly.
    pub balance_cents: i64,

    /// Derived payment status. Never set directly.
    pub status: PaymentStatus,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Recomputes the derived `balance_cents`/`status` pair.
    pub fn refresh_state(&mut self, as_of: DateTime<Utc>) {
        let state = self.financial_state(as_of);
        self.balance_cents = state.balance.cents();
        self.status = state.status;
    }
}

impl Obligation for Loan {
    fn amount_due(&self) -> Money {
        Money::from_cents(self.principal_cents)
    }

    fn amount_paid(&self) -> Money {
        Money::from_cents(self.repaid_cents)
    }

    fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_expense() -> Expense {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Expense {
            id: "e-1".to_string(),
            title: "March rent".to_string(),
            category: Some("rent".to_string()),
            amount_due_cents: 50_000,
            amount_paid_cents: 0,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            balance_cents: 0,
            status: PaymentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn refresh_state_writes_derived_fields() {
        let mut expense = sample_expense();
        expense.refresh_state(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(expense.balance_cents, 50_000);
        assert_eq!(expense.status, PaymentStatus::Overdue);

        expense.amount_paid_cents = 20_000;
        expense.refresh_state(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(expense.balance_cents, 30_000);
        assert_eq!(expense.status, PaymentStatus::PartiallyPaid);
    }

    #[test]
    fn sale_obligation_uses_total_as_due() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut sale = Sale {
            id: "s-1".to_string(),
            invoice_number: "INV-0001".to_string(),
            customer_id: Some("c-1".to_string()),
            sale_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            total_cents: 12_000,
            amount_paid_cents: 12_000,
            due_date: None,
            balance_cents: 0,
            status: PaymentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        sale.refresh_state(now);
        assert_eq!(sale.status, PaymentStatus::FullyPaid);
        assert_eq!(sale.balance_cents, 0);
    }

    #[test]
    fn product_low_stock_and_can_sell() {
        let now = Utc::now();
        let product = Product {
            id: "p-1".to_string(),
            category_id: None,
            sku: "PEN-01".to_string(),
            name: "Ballpoint Pen".to_string(),
            description: None,
            unit_price_cents: 150,
            unit_cost_cents: Some(90),
            stock_quantity: 5,
            reorder_level: Some(10),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(product.is_low_stock());
        assert!(product.can_sell(5));
        assert!(!product.can_sell(6));
    }
}
