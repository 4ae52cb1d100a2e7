//! # Purchase Repository
//!
//! Database operations for stock-in events.
//!
//! ## Transaction Shape
//! ```text
//! record()
//!   BEGIN
//!     INSERT INTO purchases (...)
//!     UPDATE products SET stock_quantity = stock_quantity + qty
//!   COMMIT
//! ```
//! The stock bump and the purchase row land together or not at all.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopbook_core::validation::{validate_amount_cents, validate_quantity};
use shopbook_core::{CoreError, Money, Purchase};

/// Input for recording a purchase.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub vendor_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub reference: Option<String>,
    pub purchased_at: NaiveDate,
}

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Records a purchase and increments the product's stock, atomically.
    pub async fn record(&self, new: NewPurchase) -> DbResult<Purchase> {
        validate_quantity(new.quantity).map_err(CoreError::from)?;
        validate_amount_cents("unit_cost", new.unit_cost_cents).map_err(CoreError::from)?;

        let now = Utc::now();
        let total = Money::from_cents(new.unit_cost_cents).multiply_quantity(new.quantity);

        let purchase = Purchase {
            id: Uuid::new_v4().to_string(),
            vendor_id: new.vendor_id,
            product_id: new.product_id,
            quantity: new.quantity,
            unit_cost_cents: new.unit_cost_cents,
            total_cents: total.cents(),
            reference: new.reference,
            purchased_at: new.purchased_at,
            created_at: now,
        };

        debug!(
            id = %purchase.id,
            product_id = %purchase.product_id,
            quantity = %purchase.quantity,
            total = %total,
            "Recording purchase"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, vendor_id, product_id, quantity, unit_cost_cents,
                total_cents, reference, purchased_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.vendor_id)
        .bind(&purchase.product_id)
        .bind(purchase.quantity)
        .bind(purchase.unit_cost_cents)
        .bind(purchase.total_cents)
        .bind(&purchase.reference)
        .bind(purchase.purchased_at)
        .bind(purchase.created_at)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&purchase.product_id)
        .bind(purchase.quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &purchase.product_id));
        }

        tx.commit().await?;

        Ok(purchase)
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, vendor_id, product_id, quantity, unit_cost_cents,
                   total_cents, reference, purchased_at, created_at
            FROM purchases
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Lists purchases, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, vendor_id, product_id, quantity, unit_cost_cents,
                   total_cents, reference, purchased_at, created_at
            FROM purchases
            ORDER BY purchased_at DESC, created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Lists purchases from one vendor, most recent first.
    pub async fn list_by_vendor(&self, vendor_id: &str) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, vendor_id, product_id, quantity, unit_cost_cents,
                   total_cents, reference, purchased_at, created_at
            FROM purchases
            WHERE vendor_id = ?1
            ORDER BY purchased_at DESC, created_at DESC
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::catalog::NewProduct;
    use crate::repository::party::NewParty;

    async fn setup() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let vendor = db
            .parties()
            .create_vendor(NewParty {
                name: "Acme Wholesale".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let product = db
            .catalog()
            .create_product(NewProduct {
                category_id: None,
                sku: "PEN-01".to_string(),
                name: "Ballpoint Pen".to_string(),
                description: None,
                unit_price_cents: 150,
                unit_cost_cents: Some(90),
                stock_quantity: 10,
                reorder_level: None,
            })
            .await
            .unwrap();

        (db, vendor.id, product.id)
    }

    #[tokio::test]
    async fn test_purchase_increments_stock() {
        let (db, vendor_id, product_id) = setup().await;

        let purchase = db
            .purchases()
            .record(NewPurchase {
                vendor_id: vendor_id.clone(),
                product_id: product_id.clone(),
                quantity: 24,
                unit_cost_cents: 85,
                reference: Some("ACME-1042".to_string()),
                purchased_at: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(purchase.total_cents, 24 * 85);

        let product = db.catalog().get_product(&product_id).await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 34);

        let listed = db.purchases().list_by_vendor(&vendor_id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_for_missing_product_rolls_back() {
        let (db, vendor_id, _) = setup().await;

        let err = db
            .purchases()
            .record(NewPurchase {
                vendor_id,
                product_id: "missing".to_string(),
                quantity: 5,
                unit_cost_cents: 85,
                reference: None,
                purchased_at: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            })
            .await
            .unwrap_err();

        // Foreign key or not-found, depending on which statement trips first.
        assert!(matches!(
            err,
            DbError::ForeignKeyViolation { .. } | DbError::NotFound { .. }
        ));

        assert!(db.purchases().list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected() {
        let (db, vendor_id, product_id) = setup().await;

        let err = db
            .purchases()
            .record(NewPurchase {
                vendor_id,
                product_id,
                quantity: 0,
                unit_cost_cents: 85,
                reference: None,
                purchased_at: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }
}
