//! # Repository Module
//!
//! Database repository implementations for Shopbook.
//!
//! ## Repository Pattern
//! ```text
//! Caller
//!   │   db.expenses().record_payment(id, amount)
//!   ▼
//! ExpenseRepository
//!   │   load row → shopbook-core derivation → UPDATE
//!   ▼
//! SQLite
//! ```
//!
//! Each repository is a thin, cloneable wrapper over the shared pool. SQL
//! is isolated here; business logic is not. Any write that creates a
//! monetary obligation or touches its due/paid amounts recomputes the
//! derived `balance_cents`/`status` pair through shopbook-core immediately
//! before the SQL runs, so the stored columns are pure caches of the one
//! shared derivation.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Categories and products
//! - [`party::PartyRepository`] - Vendors and customers
//! - [`purchase::PurchaseRepository`] - Stock-in events
//! - [`sale::SaleRepository`] - Sales, line items, receivables
//! - [`expense::ExpenseRepository`] - Expense bills
//! - [`loan::LoanRepository`] - Loans

pub mod catalog;
pub mod expense;
pub mod loan;
pub mod party;
pub mod purchase;
pub mod sale;
