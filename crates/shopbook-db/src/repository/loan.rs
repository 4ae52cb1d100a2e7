//! # Loan Repository
//!
//! Database operations for money the shop has borrowed. A loan is the
//! same obligation shape as an expense or a receivable: principal owed,
//! repayments made, optional due date, and a derived balance/status pair.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopbook_core::validation::{validate_amount_cents, validate_name, validate_payment};
use shopbook_core::{CoreError, Loan, Obligation, PaymentStatus};

/// Input for recording a loan.
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub lender: String,
    pub principal_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Repository for loan database operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Records a loan with its derived state.
    pub async fn create(&self, new: NewLoan) -> DbResult<Loan> {
        validate_name("lender", &new.lender).map_err(CoreError::from)?;
        validate_amount_cents("principal", new.principal_cents).map_err(CoreError::from)?;

        let now = Utc::now();
        let mut loan = Loan {
            id: Uuid::new_v4().to_string(),
            lender: new.lender.trim().to_string(),
            principal_cents: new.principal_cents,
            repaid_cents: 0,
            due_date: new.due_date,
            balance_cents: 0,
            status: PaymentStatus::Pending,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        loan.refresh_state(now);

        info!(
            id = %loan.id,
            lender = %loan.lender,
            principal = %loan.principal_cents,
            status = %loan.status,
            "Loan recorded"
        );

        sqlx::query(
            r#"
            INSERT INTO loans (
                id, lender, principal_cents, repaid_cents, due_date,
                balance_cents, status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.lender)
        .bind(loan.principal_cents)
        .bind(loan.repaid_cents)
        .bind(loan.due_date)
        .bind(loan.balance_cents)
        .bind(loan.status)
        .bind(&loan.notes)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Gets a loan by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, lender, principal_cents, repaid_cents, due_date,
                   balance_cents, status, notes, created_at, updated_at
            FROM loans
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(loan)
    }

    /// Lists all loans, newest first.
    pub async fn list(&self) -> DbResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, lender, principal_cents, repaid_cents, due_date,
                   balance_cents, status, notes, created_at, updated_at
            FROM loans
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Lists loans still owed money, soonest due first.
    pub async fn list_outstanding(&self) -> DbResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, lender, principal_cents, repaid_cents, due_date,
                   balance_cents, status, notes, created_at, updated_at
            FROM loans
            WHERE balance_cents > 0
            ORDER BY due_date IS NULL, due_date, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Records a repayment against a loan's balance.
    pub async fn record_repayment(&self, id: &str, amount_cents: i64) -> DbResult<Loan> {
        let mut loan = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Loan", id))?;

        let outstanding = (loan.amount_due() - loan.amount_paid()).cents();
        validate_payment(amount_cents, outstanding).map_err(CoreError::from)?;

        let now = Utc::now();
        loan.repaid_cents += amount_cents;
        loan.updated_at = now;
        loan.refresh_state(now);

        info!(
            id = %loan.id,
            amount = %amount_cents,
            balance = %loan.balance_cents,
            status = %loan.status,
            "Loan repayment recorded"
        );

        self.persist_amounts(&loan).await?;

        Ok(loan)
    }

    /// Re-derives the stored status of Pending loans whose due date has
    /// passed. Returns how many rows changed.
    pub async fn refresh_overdue(&self, as_of: DateTime<Utc>) -> DbResult<usize> {
        let pending = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, lender, principal_cents, repaid_cents, due_date,
                   balance_cents, status, notes, created_at, updated_at
            FROM loans
            WHERE status = ?1
            "#,
        )
        .bind(PaymentStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        let mut changed = 0;
        for mut loan in pending {
            let state = loan.financial_state(as_of);
            if state.status != loan.status {
                loan.refresh_state(as_of);
                loan.updated_at = as_of;
                self.persist_amounts(&loan).await?;
                changed += 1;
            }
        }

        if changed > 0 {
            info!(changed = %changed, "Loan statuses refreshed");
        }

        Ok(changed)
    }

    /// Writes the repayment amount and the freshly derived pair back.
    async fn persist_amounts(&self, loan: &Loan) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE loans SET
                repaid_cents = ?2,
                balance_cents = ?3,
                status = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&loan.id)
        .bind(loan.repaid_cents)
        .bind(loan.balance_cents)
        .bind(loan.status)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Loan", &loan.id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn startup_loan() -> NewLoan {
        NewLoan {
            lender: "First Street Bank".to_string(),
            principal_cents: 500_000,
            due_date: NaiveDate::from_ymd_opt(2999, 6, 1),
            notes: Some("startup capital".to_string()),
        }
    }

    #[tokio::test]
    async fn test_loan_lifecycle() {
        let db = test_db().await;
        let repo = db.loans();

        let loan = repo.create(startup_loan()).await.unwrap();
        assert_eq!(loan.balance_cents, 500_000);
        assert_eq!(loan.status, PaymentStatus::Pending);

        let partial = repo.record_repayment(&loan.id, 200_000).await.unwrap();
        assert_eq!(partial.balance_cents, 300_000);
        assert_eq!(partial.status, PaymentStatus::PartiallyPaid);

        let settled = repo.record_repayment(&loan.id, 300_000).await.unwrap();
        assert_eq!(settled.balance_cents, 0);
        assert_eq!(settled.status, PaymentStatus::FullyPaid);

        assert!(repo.list_outstanding().await.unwrap().is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_over_repayment_rejected() {
        let db = test_db().await;
        let repo = db.loans();

        let loan = repo.create(startup_loan()).await.unwrap();
        let err = repo.record_repayment(&loan.id, 600_000).await.unwrap_err();
        assert!(matches!(err, DbError::Core(_)));
    }

    #[tokio::test]
    async fn test_refresh_overdue_flips_pending_loans() {
        let db = test_db().await;
        let repo = db.loans();

        let loan = repo.create(startup_loan()).await.unwrap();

        let far_future = Utc.with_ymd_and_hms(3000, 1, 1, 0, 0, 0).unwrap();
        let changed = repo.refresh_overdue(far_future).await.unwrap();
        assert_eq!(changed, 1);

        let stored = repo.get_by_id(&loan.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Overdue);

        // A second sweep is a no-op.
        assert_eq!(repo.refresh_overdue(far_future).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repayment_on_missing_loan() {
        let db = test_db().await;
        let err = db
            .loans()
            .record_repayment("missing", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
