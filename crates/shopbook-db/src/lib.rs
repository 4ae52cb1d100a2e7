//! # shopbook-db: Database Layer for Shopbook
//!
//! This crate provides database access for the Shopbook back office.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                       Shopbook Data Flow                          │
//! │                                                                   │
//! │  Caller (app shell, seed binary, tests)                           │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  ┌───────────────────────────────────────────────────────────┐   │
//! │  │                  shopbook-db (THIS CRATE)                 │   │
//! │  │                                                           │   │
//! │  │   ┌─────────────┐   ┌───────────────┐   ┌─────────────┐  │   │
//! │  │   │  Database   │   │ Repositories  │   │ Migrations  │  │   │
//! │  │   │  (pool.rs)  │   │ (catalog.rs,  │   │ (embedded)  │  │   │
//! │  │   │             │◄──│  sale.rs,     │   │             │  │   │
//! │  │   │ SqlitePool  │   │  expense.rs,  │   │ 001_initial │  │   │
//! │  │   │ Config      │   │  loan.rs ...) │   │ _schema.sql │  │   │
//! │  │   └─────────────┘   └───────┬───────┘   └─────────────┘  │   │
//! │  │                            │                             │   │
//! │  │          every balance/status column written here        │   │
//! │  │          comes from shopbook-core's derivation           │   │
//! │  └───────────────────────────┼─────────────────────────────┘   │
//! │                              ▼                                   │
//! │                     SQLite Database (shopbook.db)                │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, sale, expense, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("shopbook.db")).await?;
//!
//! let products = db.catalog().search("pen", 20).await?;
//! let receivables = db.sales().list_outstanding().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::loan::LoanRepository;
pub use repository::party::PartyRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
