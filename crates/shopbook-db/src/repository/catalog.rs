//! # Catalog Repository
//!
//! Database operations for categories and products.
//!
//! ## Key Operations
//! - Category and product CRUD
//! - Name/SKU search (`LIKE`, indexed on name)
//! - Stock adjustment (used inside purchase/sale transactions too)
//! - Low-stock listing for reorder screens

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopbook_core::validation::{validate_amount_cents, validate_name, validate_sku};
use shopbook_core::{Category, CoreError, Product};

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Option<String>,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    pub unit_cost_cents: Option<i64>,
    pub stock_quantity: i64,
    pub reorder_level: Option<i64>,
}

/// Input for editing a product. Stock is deliberately absent: it moves
/// through purchases, sales, and `adjust_stock` only.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub category_id: Option<String>,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    pub unit_cost_cents: Option<i64>,
    pub reorder_level: Option<i64>,
}

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
/// let results = repo.search("pen", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Creates a category.
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<Category> {
        validate_name("name", name).map_err(CoreError::from)?;

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(id = %category.id, name = %category.name, "Creating category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category by ID.
    pub async fn get_category(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Renames a category and/or replaces its description.
    pub async fn update_category(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<()> {
        validate_name("name", name).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = ?2, description = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name.trim())
        .bind(description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Deletes a category. Fails with a foreign key violation while any
    /// product still references it.
    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Lists all categories, alphabetically.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Creates a product.
    pub async fn create_product(&self, new: NewProduct) -> DbResult<Product> {
        validate_sku(&new.sku).map_err(CoreError::from)?;
        validate_name("name", &new.name).map_err(CoreError::from)?;
        validate_amount_cents("unit_price", new.unit_price_cents).map_err(CoreError::from)?;
        if let Some(cost) = new.unit_cost_cents {
            validate_amount_cents("unit_cost", cost).map_err(CoreError::from)?;
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            category_id: new.category_id,
            sku: new.sku.trim().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            unit_price_cents: new.unit_price_cents,
            unit_cost_cents: new.unit_cost_cents,
            stock_quantity: new.stock_quantity,
            reorder_level: new.reorder_level,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, sku = %product.sku, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category_id, sku, name, description,
                unit_price_cents, unit_cost_cents, stock_quantity, reorder_level,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(product.unit_cost_cents)
        .bind(product.stock_quantity)
        .bind(product.reorder_level)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Edits a product's details (reprice, rename, recategorize, change
    /// reorder level). Same validation as creation.
    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> DbResult<Product> {
        validate_sku(&update.sku).map_err(CoreError::from)?;
        validate_name("name", &update.name).map_err(CoreError::from)?;
        validate_amount_cents("unit_price", update.unit_price_cents).map_err(CoreError::from)?;
        if let Some(cost) = update.unit_cost_cents {
            validate_amount_cents("unit_cost", cost).map_err(CoreError::from)?;
        }

        let now = Utc::now();

        debug!(id = %id, sku = %update.sku, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                category_id = ?2,
                sku = ?3,
                name = ?4,
                description = ?5,
                unit_price_cents = ?6,
                unit_cost_cents = ?7,
                reorder_level = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.category_id)
        .bind(update.sku.trim())
        .bind(update.name.trim())
        .bind(&update.description)
        .bind(update.unit_price_cents)
        .bind(update.unit_cost_cents)
        .bind(update.reorder_level)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        // Sale items keep their snapshots; only the live row changes.
        let product = self
            .get_product(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, sku, name, description,
                   unit_price_cents, unit_cost_cents, stock_quantity, reorder_level,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by SKU.
    pub async fn get_product_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, sku, name, description,
                   unit_price_cents, unit_cost_cents, stock_quantity, reorder_level,
                   is_active, created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by name or SKU (prefix/substring match).
    ///
    /// Empty query returns active products alphabetically.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        let pattern = format!("%{}%", query);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, sku, name, description,
                   unit_price_cents, unit_cost_cents, stock_quantity, reorder_level,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1 AND (name LIKE ?1 OR sku LIKE ?1)
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Adjusts a product's stock by a signed delta.
    ///
    /// Used directly for manual corrections; purchases and sales adjust
    /// stock inside their own transactions.
    pub async fn adjust_stock(&self, product_id: &str, delta: i64) -> DbResult<()> {
        let now = Utc::now();

        debug!(product_id = %product_id, delta = %delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Soft-deletes a product.
    pub async fn deactivate_product(&self, product_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(product_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Lists active products at or below their reorder level.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category_id, sku, name, description,
                   unit_price_cents, unit_cost_cents, stock_quantity, reorder_level,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
              AND reorder_level IS NOT NULL
              AND stock_quantity <= reorder_level
            ORDER BY stock_quantity
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts active products.
    pub async fn count_products(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
