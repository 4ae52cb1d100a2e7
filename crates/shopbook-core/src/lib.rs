//! # shopbook-core: Pure Business Logic for Shopbook
//!
//! This crate is the **heart** of Shopbook. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Shopbook Architecture                        │
//! │                                                                  │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                  Callers (UI / tooling)                    │  │
//! │  └───────────────────────────┬────────────────────────────────┘  │
//! │                              │                                   │
//! │  ┌───────────────────────────▼────────────────────────────────┐  │
//! │  │              ★ shopbook-core (THIS CRATE) ★                │  │
//! │  │                                                            │  │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐       │  │
//! │  │   │  types  │ │  money  │ │ finance │ │ validation│       │  │
//! │  │   │ Product │ │  Money  │ │ assess  │ │   rules   │       │  │
//! │  │   │ Expense │ │  cents  │ │ status  │ │   checks  │       │  │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └───────────┘       │  │
//! │  │                                                            │  │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS   │  │
//! │  └───────────────────────────┬────────────────────────────────┘  │
//! │                              │                                   │
//! │  ┌───────────────────────────▼────────────────────────────────┐  │
//! │  │                shopbook-db (Database Layer)                │  │
//! │  │           SQLite queries, migrations, repositories         │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Expense, Loan, etc.)
//! - [`money`] - Money type with integer-cent arithmetic (no floats!)
//! - [`finance`] - The balance/status derivation shared by every layer
//! - [`validation`] - Business rule validation
//! - [`view`] - Presentation DTOs (listing rows, live previews)
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; time is a parameter,
//!    never read from a global clock
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **One Derivation**: balance/status is computed in [`finance`] only;
//!    persistence and presentation both import it from here
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use shopbook_core::finance::{assess, PaymentStatus};
//! use shopbook_core::money::Money;
//!
//! let state = assess(
//!     Money::from_cents(10_000),                // $100.00 due
//!     Money::zero(),                            // nothing paid
//!     NaiveDate::from_ymd_opt(2024, 1, 1),      // due date
//!     Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
//! );
//! assert_eq!(state.status, PaymentStatus::Overdue);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod finance;
pub mod money;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shopbook_core::Money` instead of
// `use shopbook_core::money::Money`.

pub use error::{CoreError, CoreResult, ValidationError};
pub use finance::{assess, FinancialState, Obligation, PaymentStatus};
pub use money::Money;
pub use types::*;
