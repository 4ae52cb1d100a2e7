//! # Financial State Module
//!
//! Derives the `balance` and `status` of a monetary obligation.
//!
//! ## The One Rule
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  balance = amount_due - amount_paid                                │
//! │                                                                    │
//! │  status:                                                           │
//! │    1. balance <= 0                      → FullyPaid                │
//! │    2. amount_paid > 0                   → PartiallyPaid            │
//! │    3. due date set and as_of past it    → Overdue                  │
//! │    4. otherwise                         → Pending                  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expenses, credit sales (receivables), and loans all share this exact
//! derivation. The classic bug in shop software is the frontend computing
//! one status while the database trigger stores another; here both the
//! repository layer and the view layer call [`assess`], so they cannot
//! disagree.
//!
//! ## Determinism
//! `as_of` is always an explicit parameter. This module never reads the
//! clock; callers resolve "now" themselves (repositories pass `Utc::now()`,
//! tests pass fixed instants).
//!
//! ## Usage
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use shopbook_core::finance::{assess, PaymentStatus};
//! use shopbook_core::money::Money;
//!
//! let state = assess(
//!     Money::from_cents(10_000),
//!     Money::from_cents(4_000),
//!     None,
//!     Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
//! );
//! assert_eq!(state.balance.cents(), 6_000);
//! assert_eq!(state.status, PaymentStatus::PartiallyPaid);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Payment Status
// =============================================================================

/// Categorical payment state of an obligation.
///
/// Not a persisted state machine: the status is re-derived from scratch on
/// every call, so there are no transitions to enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid yet, not past due (or no due date at all).
    Pending,
    /// Some payment made but a positive balance remains.
    ///
    /// A partial payment suppresses `Overdue` permanently, even after the
    /// due date passes.
    PartiallyPaid,
    /// Balance is zero or negative (exact payment or overpayment).
    FullyPaid,
    /// Nothing paid at all and the due date has passed.
    Overdue,
}

impl PaymentStatus {
    /// Whether this status represents a settled obligation.
    #[inline]
    pub const fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::FullyPaid)
    }

    /// Whether the obligation still needs attention (money outstanding).
    #[inline]
    pub const fn is_outstanding(&self) -> bool {
        !self.is_settled()
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::FullyPaid => "fully_paid",
            PaymentStatus::Overdue => "overdue",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Financial State
// =============================================================================

/// The derived pair every obligation carries: balance + status.
///
/// Returned by [`assess`]; persisted alongside the record by the repository
/// layer and rendered by the view layer. Never constructed by hand outside
/// of tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialState {
    /// Amount still owed: `amount_due - amount_paid`. Negative on
    /// overpayment; not clamped.
    pub balance: Money,
    /// Categorical payment state, see [`PaymentStatus`].
    pub status: PaymentStatus,
}

// =============================================================================
// Assessment
// =============================================================================

/// Derives `balance` and `status` for a monetary obligation.
///
/// ## Contract
/// - Pure and total: no error path, no I/O, no hidden state. Calling it
///   twice with identical inputs yields identical output.
/// - Precondition (caller-enforced, see [`crate::validation`]):
///   `amount_due >= 0` and `amount_paid >= 0`. The function does not
///   reject negative inputs or a negative resulting balance.
/// - `as_of` is the instant "overdue" is evaluated against. Due dates are
///   calendar dates, so an obligation becomes overdue the day *after* its
///   due date, regardless of time of day.
///
/// ## Classification order
/// The order is deliberate: a balance ≤ 0 always wins, because fully paid
/// is the terminal, most specific state. `Overdue` only applies to wholly
/// unpaid obligations; one partial payment before or after the due date
/// keeps the obligation `PartiallyPaid` forever.
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use shopbook_core::finance::{assess, PaymentStatus};
/// use shopbook_core::money::Money;
///
/// let due_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
///
/// let state = assess(Money::from_cents(10_000), Money::zero(), Some(due_date), as_of);
/// assert_eq!(state.status, PaymentStatus::Overdue);
/// assert_eq!(state.balance.cents(), 10_000);
/// ```
pub fn assess(
    amount_due: Money,
    amount_paid: Money,
    due_date: Option<NaiveDate>,
    as_of: DateTime<Utc>,
) -> FinancialState {
    let balance = amount_due - amount_paid;

    let status = if balance.cents() <= 0 {
        PaymentStatus::FullyPaid
    } else if amount_paid.is_positive() {
        PaymentStatus::PartiallyPaid
    } else if due_date.is_some_and(|due| as_of.date_naive() > due) {
        PaymentStatus::Overdue
    } else {
        PaymentStatus::Pending
    };

    FinancialState { balance, status }
}

// =============================================================================
// Obligation Trait
// =============================================================================

/// Anything that owes or is owed money: expense bills, sale receivables,
/// loans.
///
/// The trait is the single shared entry point for derived financial state.
/// Implementors expose the three raw inputs; `financial_state` is provided
/// so no implementor can reimplement the arithmetic differently.
pub trait Obligation {
    /// Total amount owed.
    fn amount_due(&self) -> Money;

    /// Cumulative amount paid so far.
    fn amount_paid(&self) -> Money;

    /// When payment is contractually due. `None` means the obligation can
    /// never become overdue.
    fn due_date(&self) -> Option<NaiveDate>;

    /// Derives the current balance and status as of the given instant.
    fn financial_state(&self, as_of: DateTime<Utc>) -> FinancialState {
        assess(self.amount_due(), self.amount_paid(), self.due_date(), as_of)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    #[test]
    fn balance_is_due_minus_paid() {
        for (due, paid) in [(0, 0), (100, 0), (100, 40), (100, 100), (100, 120)] {
            let state = assess(cents(due), cents(paid), None, instant(2024, 6, 1));
            assert_eq!(state.balance.cents(), due - paid);
        }
    }

    #[test]
    fn exact_payment_is_fully_paid() {
        let state = assess(cents(10_000), cents(10_000), None, instant(2024, 6, 1));
        assert_eq!(state.balance.cents(), 0);
        assert_eq!(state.status, PaymentStatus::FullyPaid);
    }

    #[test]
    fn overpayment_is_fully_paid_with_negative_balance() {
        let state = assess(cents(10_000), cents(12_000), None, instant(2024, 6, 1));
        assert_eq!(state.balance.cents(), -2_000);
        assert_eq!(state.status, PaymentStatus::FullyPaid);
    }

    #[test]
    fn fully_paid_beats_overdue() {
        // Paid in full long after the due date: still fully paid.
        let state = assess(
            cents(10_000),
            cents(10_000),
            Some(date(2024, 1, 1)),
            instant(2024, 6, 1),
        );
        assert_eq!(state.status, PaymentStatus::FullyPaid);
    }

    #[test]
    fn partial_payment_before_due_date() {
        let state = assess(
            cents(10_000),
            cents(4_000),
            Some(date(2024, 12, 1)),
            instant(2024, 6, 1),
        );
        assert_eq!(state.balance.cents(), 6_000);
        assert_eq!(state.status, PaymentStatus::PartiallyPaid);
    }

    #[test]
    fn partial_payment_suppresses_overdue() {
        // Due date long past, but one partial payment was made: the
        // obligation stays partially paid forever.
        let state = assess(
            cents(10_000),
            cents(4_000),
            Some(date(2024, 1, 1)),
            instant(2025, 6, 1),
        );
        assert_eq!(state.status, PaymentStatus::PartiallyPaid);
    }

    #[test]
    fn unpaid_past_due_is_overdue() {
        let state = assess(
            cents(10_000),
            Money::zero(),
            Some(date(2024, 1, 1)),
            instant(2024, 6, 1),
        );
        assert_eq!(state.balance.cents(), 10_000);
        assert_eq!(state.status, PaymentStatus::Overdue);
    }

    #[test]
    fn unpaid_before_due_date_is_pending() {
        let state = assess(
            cents(10_000),
            Money::zero(),
            Some(date(2024, 12, 1)),
            instant(2024, 6, 1),
        );
        assert_eq!(state.status, PaymentStatus::Pending);
    }

    #[test]
    fn on_the_due_date_is_not_yet_overdue() {
        // Calendar-date granularity: overdue starts the day after.
        let state = assess(
            cents(10_000),
            Money::zero(),
            Some(date(2024, 6, 1)),
            instant(2024, 6, 1),
        );
        assert_eq!(state.status, PaymentStatus::Pending);

        let next_day = assess(
            cents(10_000),
            Money::zero(),
            Some(date(2024, 6, 1)),
            instant(2024, 6, 2),
        );
        assert_eq!(next_day.status, PaymentStatus::Overdue);
    }

    #[test]
    fn no_due_date_is_never_overdue() {
        let state = assess(cents(10_000), Money::zero(), None, instant(2099, 1, 1));
        assert_eq!(state.status, PaymentStatus::Pending);
    }

    #[test]
    fn zero_due_zero_paid_counts_as_settled() {
        // A zero-amount obligation has nothing outstanding.
        let state = assess(Money::zero(), Money::zero(), None, instant(2024, 6, 1));
        assert_eq!(state.balance.cents(), 0);
        assert_eq!(state.status, PaymentStatus::FullyPaid);
    }

    #[test]
    fn assessment_is_idempotent() {
        let args = (
            cents(10_000),
            cents(2_500),
            Some(date(2024, 3, 15)),
            instant(2024, 6, 1),
        );
        let first = assess(args.0, args.1, args.2, args.3);
        let second = assess(args.0, args.1, args.2, args.3);
        assert_eq!(first, second);
    }

    #[test]
    fn status_labels() {
        assert_eq!(PaymentStatus::PartiallyPaid.to_string(), "partially_paid");
        assert_eq!(PaymentStatus::Overdue.to_string(), "overdue");
        assert!(PaymentStatus::FullyPaid.is_settled());
        assert!(PaymentStatus::Overdue.is_outstanding());
    }

    #[test]
    fn trait_entry_point_matches_free_function() {
        struct Bill;
        impl Obligation for Bill {
            fn amount_due(&self) -> Money {
                cents(10_000)
            }
            fn amount_paid(&self) -> Money {
                cents(4_000)
            }
            fn due_date(&self) -> Option<NaiveDate> {
                Some(date(2024, 1, 1))
            }
        }

        let as_of = instant(2024, 6, 1);
        assert_eq!(
            Bill.financial_state(as_of),
            assess(cents(10_000), cents(4_000), Some(date(2024, 1, 1)), as_of)
        );
    }
}
