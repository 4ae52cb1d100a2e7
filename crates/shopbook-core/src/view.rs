//! # View Module
//!
//! Presentation DTOs: the shapes the UI layer renders.
//!
//! ## Why These Live in Core
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  Persistence layer ──► finance::assess ◄── View layer (this file)  │
//! │                                                                    │
//! │  Both collaborators import the same derivation from this crate.    │
//! │  A stored row and a live on-screen preview therefore always agree  │
//! │  for the same inputs and as_of.                                    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because `Overdue` depends on the clock, stored status columns go stale
//! overnight. View DTOs re-derive status at render time instead of
//! trusting the column, which is treated as a cache.
//!
//! Field names are camelCase on the wire, matching the frontend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::finance::{assess, Obligation, PaymentStatus};
use crate::money::Money;
use crate::types::{Expense, Loan, Sale};

// =============================================================================
// Live Preview
// =============================================================================

/// Live balance/status preview for a record being edited in a form,
/// before anything is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePreview {
    pub balance_cents: i64,
    /// Human-readable balance, e.g. "$60.00" or "-$20.00".
    pub balance_display: String,
    pub status: PaymentStatus,
}

impl StatePreview {
    /// Computes a preview from raw form inputs.
    ///
    /// Same contract as the repository layer: identical inputs and `as_of`
    /// produce the exact state that would be stored on save.
    pub fn compute(
        amount_due_cents: i64,
        amount_paid_cents: i64,
        due_date: Option<NaiveDate>,
        as_of: DateTime<Utc>,
    ) -> Self {
        let state = assess(
            Money::from_cents(amount_due_cents),
            Money::from_cents(amount_paid_cents),
            due_date,
            as_of,
        );

        StatePreview {
            balance_cents: state.balance.cents(),
            balance_display: state.balance.to_string(),
            status: state.status,
        }
    }
}

// =============================================================================
// Listing Rows
// =============================================================================

/// A receivables listing row: one credit sale and where it stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableView {
    pub sale_id: String,
    pub invoice_number: String,
    pub customer_id: Option<String>,
    pub sale_date: NaiveDate,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub balance_cents: i64,
    pub status: PaymentStatus,
    /// Days past the due date. `Some` only when status is `Overdue`.
    pub days_overdue: Option<i64>,
}

impl ReceivableView {
    /// Builds a row for the receivables list, re-deriving state as of the
    /// given instant.
    pub fn for_sale(sale: &Sale, as_of: DateTime<Utc>) -> Self {
        let state = sale.financial_state(as_of);

        ReceivableView {
            sale_id: sale.id.clone(),
            invoice_number: sale.invoice_number.clone(),
            customer_id: sale.customer_id.clone(),
            sale_date: sale.sale_date,
            total_cents: sale.total_cents,
            amount_paid_cents: sale.amount_paid_cents,
            due_date: sale.due_date,
            balance_cents: state.balance.cents(),
            status: state.status,
            days_overdue: days_overdue(sale.due_date, state.status, as_of),
        }
    }
}

/// An expenses listing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    pub expense_id: String,
    pub title: String,
    pub category: Option<String>,
    pub amount_due_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub balance_cents: i64,
    pub status: PaymentStatus,
    pub days_overdue: Option<i64>,
}

impl ExpenseView {
    /// Builds a row for the expenses list, re-deriving state as of the
    /// given instant.
    pub fn for_expense(expense: &Expense, as_of: DateTime<Utc>) -> Self {
        let state = expense.financial_state(as_of);

        ExpenseView {
            expense_id: expense.id.clone(),
            title: expense.title.clone(),
            category: expense.category.clone(),
            amount_due_cents: expense.amount_due_cents,
            amount_paid_cents: expense.amount_paid_cents,
            due_date: expense.due_date,
            balance_cents: state.balance.cents(),
            status: state.status,
            days_overdue: days_overdue(expense.due_date, state.status, as_of),
        }
    }
}

/// A loans listing row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub loan_id: String,
    pub lender: String,
    pub principal_cents: i64,
    pub repaid_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub balance_cents: i64,
    pub status: PaymentStatus,
    pub days_overdue: Option<i64>,
}

impl LoanView {
    /// Builds a row for the loans list, re-deriving state as of the given
    /// instant.
    pub fn for_loan(loan: &Loan, as_of: DateTime<Utc>) -> Self {
        let state = loan.financial_state(as_of);

        LoanView {
            loan_id: loan.id.clone(),
            lender: loan.lender.clone(),
            principal_cents: loan.principal_cents,
            repaid_cents: loan.repaid_cents,
            due_date: loan.due_date,
            balance_cents: state.balance.cents(),
            status: state.status,
            days_overdue: days_overdue(loan.due_date, state.status, as_of),
        }
    }
}

/// Days past the due date, only meaningful for overdue obligations.
fn days_overdue(
    due_date: Option<NaiveDate>,
    status: PaymentStatus,
    as_of: DateTime<Utc>,
) -> Option<i64> {
    match (status, due_date) {
        (PaymentStatus::Overdue, Some(due)) => Some((as_of.date_naive() - due).num_days()),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn preview_matches_stored_derivation() {
        // The canonical drift bug: form preview vs. saved row. Both paths
        // go through assess, so they must agree.
        let due_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let as_of = instant(2024, 6, 1);

        let preview = StatePreview::compute(10_000, 4_000, due_date, as_of);

        let now = instant(2024, 5, 1);
        let mut expense = Expense {
            id: "e-1".to_string(),
            title: "Supplies".to_string(),
            category: None,
            amount_due_cents: 10_000,
            amount_paid_cents: 4_000,
            due_date,
            balance_cents: 0,
            status: PaymentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        expense.refresh_state(as_of);

        assert_eq!(preview.balance_cents, expense.balance_cents);
        assert_eq!(preview.status, expense.status);
    }

    #[test]
    fn preview_formats_balance() {
        let preview = StatePreview::compute(10_000, 4_000, None, instant(2024, 6, 1));
        assert_eq!(preview.balance_display, "$60.00");

        let overpaid = StatePreview::compute(10_000, 12_000, None, instant(2024, 6, 1));
        assert_eq!(overpaid.balance_display, "-$20.00");
        assert_eq!(overpaid.status, PaymentStatus::FullyPaid);
    }

    #[test]
    fn view_rederives_stale_status() {
        // Row was stored as Pending before its due date; rendered after
        // the due date it must show Overdue without a DB write.
        let now = instant(2024, 1, 1);
        let expense = Expense {
            id: "e-1".to_string(),
            title: "March rent".to_string(),
            category: Some("rent".to_string()),
            amount_due_cents: 50_000,
            amount_paid_cents: 0,
            due_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            balance_cents: 50_000,
            status: PaymentStatus::Pending, // stale cache
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let view = ExpenseView::for_expense(&expense, instant(2024, 3, 10));
        assert_eq!(view.status, PaymentStatus::Overdue);
        assert_eq!(view.days_overdue, Some(5));
    }

    #[test]
    fn days_overdue_only_for_overdue() {
        assert_eq!(
            days_overdue(
                NaiveDate::from_ymd_opt(2024, 1, 1),
                PaymentStatus::PartiallyPaid,
                instant(2024, 6, 1)
            ),
            None
        );
        assert_eq!(days_overdue(None, PaymentStatus::Pending, instant(2024, 6, 1)), None);
    }

    #[test]
    fn receivable_view_serializes_camel_case() {
        let now = instant(2024, 5, 1);
        let sale = Sale {
            id: "s-1".to_string(),
            invoice_number: "INV-0001".to_string(),
            customer_id: None,
            sale_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            total_cents: 12_000,
            amount_paid_cents: 0,
            due_date: None,
            balance_cents: 12_000,
            status: PaymentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let view = ReceivableView::for_sale(&sale, now);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["invoiceNumber"], "INV-0001");
        assert_eq!(json["balanceCents"], 12_000);
        assert_eq!(json["status"], "pending");
    }
}
