//! # Sale Repository
//!
//! Database operations for sales, line items, and the receivable side.
//!
//! ## Sale Lifecycle
//! ```text
//! 1. CHECKOUT (one transaction)
//!    └── create_sale() → snapshot lines, decrement stock,
//!        derive receivable state, insert everything
//!
//! 2. COLLECT
//!    └── record_payment() → amount_paid += x, re-derive state
//!    └── set_due_date()   → re-derive state
//!
//! 3. LIST
//!    └── list_outstanding() → every sale with money still owed
//! ```
//!
//! The receivable columns (`balance_cents`, `status`) follow the same
//! discipline as expenses: always the output of the shopbook-core
//! derivation, never assigned by hand.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopbook_core::validation::{validate_amount_cents, validate_payment, validate_quantity};
use shopbook_core::{CoreError, Obligation, PaymentStatus, Product, Sale, SaleItem};

/// One line of a sale being checked out.
#[derive(Debug, Clone)]
pub struct NewSaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Input for creating a sale.
#[derive(Debug, Clone)]
pub struct NewSale {
    /// Invoice number; generated when `None`.
    pub invoice_number: Option<String>,
    /// `None` for anonymous cash sales.
    pub customer_id: Option<String>,
    pub sale_date: NaiveDate,
    /// Amount collected at the counter. Equal to the total for cash
    /// sales, less (or zero) for credit sales.
    pub amount_paid_cents: i64,
    /// When the remainder is due, for credit sales.
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<NewSaleLine>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Checks out a sale: snapshots the lines, decrements stock, derives
    /// the receivable state, and inserts it all in one transaction.
    ///
    /// ## Snapshot Pattern
    /// Product details (sku, name, price) are copied onto each line, so
    /// the sale history survives later product edits.
    pub async fn create_sale(&self, new: NewSale) -> DbResult<Sale> {
        if new.lines.is_empty() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "sale must have at least one line".to_string(),
            }
            .into());
        }
        validate_amount_cents("amount_paid", new.amount_paid_cents).map_err(CoreError::from)?;
        for line in &new.lines {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;

        // Invoice numbers are INV-YYYYMMDD-NNNN with a per-day sequence,
        // counted inside the checkout transaction. The UNIQUE constraint
        // on invoice_number backstops concurrent checkouts.
        let invoice_number = match new.invoice_number {
            Some(number) => number,
            None => {
                let seq: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) + 1 FROM sales WHERE sale_date = ?1")
                        .bind(new.sale_date)
                        .fetch_one(&mut *tx)
                        .await?;
                format!("INV-{}-{:04}", new.sale_date.format("%Y%m%d"), seq)
            }
        };

        // Resolve each line against the current product row, inside the
        // transaction so the stock check and decrement are atomic.
        let mut items: Vec<SaleItem> = Vec::with_capacity(new.lines.len());
        let mut total_cents: i64 = 0;

        for line in &new.lines {
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, category_id, sku, name, description,
                       unit_price_cents, unit_cost_cents, stock_quantity, reorder_level,
                       is_active, created_at, updated_at
                FROM products
                WHERE id = ?1
                "#,
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if !product.can_sell(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    sku: product.sku,
                    available: product.stock_quantity,
                    requested: line.quantity,
                }
                .into());
            }

            let line_total = product.unit_price().multiply_quantity(line.quantity);
            total_cents += line_total.cents();

            items.push(SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: product.id.clone(),
                sku_snapshot: product.sku.clone(),
                name_snapshot: product.name.clone(),
                unit_price_cents: product.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line_total.cents(),
                created_at: now,
            });

            sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&product.id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // An up-front payment may not exceed the sale total.
        if new.amount_paid_cents > 0 {
            validate_payment(new.amount_paid_cents, total_cents).map_err(CoreError::from)?;
        }

        let mut sale = Sale {
            id: sale_id,
            invoice_number,
            customer_id: new.customer_id,
            sale_date: new.sale_date,
            total_cents,
            amount_paid_cents: new.amount_paid_cents,
            due_date: new.due_date,
            balance_cents: 0,
            status: PaymentStatus::Pending,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        sale.refresh_state(now);

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, customer_id, sale_date, total_cents,
                amount_paid_cents, due_date, balance_cents, status, notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.invoice_number)
        .bind(&sale.customer_id)
        .bind(sale.sale_date)
        .bind(sale.total_cents)
        .bind(sale.amount_paid_cents)
        .bind(sale.due_date)
        .bind(sale.balance_cents)
        .bind(sale.status)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, sku_snapshot, name_snapshot,
                    unit_price_cents, quantity, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.sku_snapshot)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %sale.id,
            invoice = %sale.invoice_number,
            total = %sale.total_cents,
            status = %sale.status,
            lines = items.len(),
            "Sale created"
        );

        Ok(sale)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_id, sale_date, total_cents,
                   amount_paid_cents, due_date, balance_cents, status, notes,
                   created_at, updated_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all line items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, sku_snapshot, name_snapshot,
                   unit_price_cents, quantity, line_total_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_id, sale_date, total_cents,
                   amount_paid_cents, due_date, balance_cents, status, notes,
                   created_at, updated_at
            FROM sales
            ORDER BY sale_date DESC, created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists sales with money still owed (the receivables book), soonest
    /// due first.
    pub async fn list_outstanding(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_id, sale_date, total_cents,
                   amount_paid_cents, due_date, balance_cents, status, notes,
                   created_at, updated_at
            FROM sales
            WHERE balance_cents > 0
            ORDER BY due_date IS NULL, due_date, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Records a customer payment against a sale's balance.
    pub async fn record_payment(&self, id: &str, amount_cents: i64) -> DbResult<Sale> {
        let mut sale = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let outstanding = (sale.amount_due() - sale.amount_paid()).cents();
        validate_payment(amount_cents, outstanding).map_err(CoreError::from)?;

        let now = Utc::now();
        sale.amount_paid_cents += amount_cents;
        sale.updated_at = now;
        sale.refresh_state(now);

        info!(
            id = %sale.id,
            amount = %amount_cents,
            balance = %sale.balance_cents,
            status = %sale.status,
            "Sale payment recorded"
        );

        self.persist_receivable(&sale).await?;

        Ok(sale)
    }

    /// Sets or clears the due date of a sale's outstanding balance,
    /// recomputing the derived state.
    pub async fn set_due_date(&self, id: &str, due_date: Option<NaiveDate>) -> DbResult<Sale> {
        let mut sale = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let now = Utc::now();
        sale.due_date = due_date;
        sale.updated_at = now;
        sale.refresh_state(now);

        self.persist_receivable(&sale).await?;

        Ok(sale)
    }

    /// Re-derives the stored status of Pending sales whose due date has
    /// passed. Returns how many rows changed.
    pub async fn refresh_overdue(&self, as_of: DateTime<Utc>) -> DbResult<usize> {
        let pending = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, invoice_number, customer_id, sale_date, total_cents,
                   amount_paid_cents, due_date, balance_cents, status, notes,
                   created_at, updated_at
            FROM sales
            WHERE status = ?1
            "#,
        )
        .bind(PaymentStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        let mut changed = 0;
        for mut sale in pending {
            let state = sale.financial_state(as_of);
            if state.status != sale.status {
                sale.refresh_state(as_of);
                sale.updated_at = as_of;
                self.persist_receivable(&sale).await?;
                changed += 1;
            }
        }

        if changed > 0 {
            info!(changed = %changed, "Sale statuses refreshed");
        }

        Ok(changed)
    }

    /// Writes the receivable columns and the freshly derived pair back.
    async fn persist_receivable(&self, sale: &Sale) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sales SET
                amount_paid_cents = ?2,
                due_date = ?3,
                balance_cents = ?4,
                status = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&sale.id)
        .bind(sale.amount_paid_cents)
        .bind(sale.due_date)
        .bind(sale.balance_cents)
        .bind(sale.status)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
