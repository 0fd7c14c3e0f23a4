//! # clowee-db: Database Layer for the Clowee back office
//!
//! SQLite storage for franchises, agreements, machines, counter readings,
//! sales and payments. Business rules live in `clowee-core`; repositories
//! load what those rules need, call them, and persist the result.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Clowee Data Flow                                 │
//! │                                                                         │
//! │  back-office command (record-sale)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     clowee-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │   (sale.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ FranchiseRepo │    │ 001_initial  │  │   │
//! │  │   │               │    │ SaleRepo ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ record_sale / aggregate       │   │
//! │  │                                ▼                               │   │
//! │  │                          clowee-core                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (clowee.db)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clowee_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("clowee.db")).await?;
//! let franchises = db.franchises().list_active().await?;
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

pub use repository::agreement::AgreementRepository;
pub use repository::franchise::FranchiseRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::machine::MachineRepository;
pub use repository::sale::{NewPayment, PaymentReceipt, SaleRepository};
