//! # Party Repository
//!
//! Database operations for vendors (who the shop buys from) and customers
//! (who the shop sells to, and collects receivables from).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopbook_core::validation::validate_name;
use shopbook_core::{CoreError, Customer, Vendor};

/// Contact details shared by vendor and customer creation.
#[derive(Debug, Clone, Default)]
pub struct NewParty {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Repository for vendor and customer database operations.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: SqlitePool,
}

impl PartyRepository {
    /// Creates a new PartyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository { pool }
    }

    // =========================================================================
    // Vendors
    // =========================================================================

    /// Creates a vendor.
    pub async fn create_vendor(&self, new: NewParty) -> DbResult<Vendor> {
        validate_name("name", &new.name).map_err(CoreError::from)?;

        let vendor = Vendor {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            phone: new.phone,
            email: new.email,
            address: new.address,
            created_at: Utc::now(),
        };

        debug!(id = %vendor.id, name = %vendor.name, "Creating vendor");

        sqlx::query(
            r#"
            INSERT INTO vendors (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&vendor.id)
        .bind(&vendor.name)
        .bind(&vendor.phone)
        .bind(&vendor.email)
        .bind(&vendor.address)
        .bind(vendor.created_at)
        .execute(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Gets a vendor by ID.
    pub async fn get_vendor(&self, id: &str) -> DbResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM vendors
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vendor)
    }

    /// Updates a vendor's name and contact details.
    pub async fn update_vendor(&self, id: &str, update: NewParty) -> DbResult<Vendor> {
        validate_name("name", &update.name).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE vendors
            SET name = ?2, phone = ?3, email = ?4, address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vendor", id));
        }

        let vendor = self
            .get_vendor(id)
            .await?
            .ok_or_else(|| DbError::not_found("Vendor", id))?;

        Ok(vendor)
    }

    /// Lists all vendors, alphabetically.
    pub async fn list_vendors(&self) -> DbResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM vendors
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vendors)
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Creates a customer.
    pub async fn create_customer(&self, new: NewParty) -> DbResult<Customer> {
        validate_name("name", &new.name).map_err(CoreError::from)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            phone: new.phone,
            email: new.email,
            address: new.address,
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, name = %customer.name, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_customer(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Updates a customer's name and contact details.
    pub async fn update_customer(&self, id: &str, update: NewParty) -> DbResult<Customer> {
        validate_name("name", &update.name).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = ?2, phone = ?3, email = ?4, address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.trim())
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        let customer = self
            .get_customer(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        Ok(customer)
    }

    /// Lists all customers, alphabetically.
    pub async fn list_customers(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, address, created_at
            FROM customers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_vendor_and_customer_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.parties();

        let vendor = repo
            .create_vendor(NewParty {
                name: "Acme Wholesale".to_string(),
                phone: Some("555-0100".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let customer = repo
            .create_customer(NewParty {
                name: "Corner Cafe".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(repo.get_vendor(&vendor.id).await.unwrap().is_some());
        assert!(repo.get_customer(&customer.id).await.unwrap().is_some());
        assert_eq!(repo.list_vendors().await.unwrap().len(), 1);
        assert_eq!(repo.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_vendor_and_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.parties();

        let vendor = repo
            .create_vendor(NewParty {
                name: "Acme Wholesale".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let updated = repo
            .update_vendor(
                &vendor.id,
                NewParty {
                    name: "Acme Wholesale Ltd".to_string(),
                    phone: Some("555-0101".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme Wholesale Ltd");
        assert_eq!(updated.phone.as_deref(), Some("555-0101"));

        let customer = repo
            .create_customer(NewParty {
                name: "Corner Cafe".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let updated = repo
            .update_customer(
                &customer.id,
                NewParty {
                    name: "Corner Cafe & Bakery".to_string(),
                    email: Some("orders@cornercafe.test".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Corner Cafe & Bakery");

        let err = repo
            .update_vendor("missing", NewParty {
                name: "Nobody".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.parties();

        let err = repo
            .create_vendor(NewParty {
                name: "  ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DbError::Core(_)));
    }
}
