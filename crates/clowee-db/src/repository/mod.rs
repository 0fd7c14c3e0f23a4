//! # Repository Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  back-office command                                                   │
//! │       │  db.sales().record(draft)                                       │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── load machine, franchise, agreements, same-period sales  ┐         │
//! │  ├── clowee_core::sale::record_sale(...)                     │ one     │
//! │  └── INSERT INTO sales                                       ┘ tx      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`FranchiseRepository`](franchise::FranchiseRepository) - Franchises and their default terms
//! - [`AgreementRepository`](agreement::AgreementRepository) - Dated pricing agreements
//! - [`MachineRepository`](machine::MachineRepository) - Machines and counter readings
//! - [`SaleRepository`](sale::SaleRepository) - Sales and payments
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Franchise invoices and reports

pub mod agreement;
pub mod franchise;
pub mod invoice;
pub mod machine;
pub mod sale;

/// Shared setup for repository tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use clowee_core::types::{Franchise, Machine, PaymentDuration, PricingTerms, Rate};
    use clowee_core::Money;
    use std::path::PathBuf;

    use crate::pool::{Database, DbConfig};

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// ৳5 coins, ৳25 dolls, 7.5% VAT, 60/40 split, ৳100 electricity.
    pub(crate) fn terms() -> PricingTerms {
        PricingTerms {
            coin_price: Money::from_major(5),
            doll_price: Money::from_major(25),
            vat_percentage: Rate::from_bps(750),
            franchise_share: Rate::from_bps(6000),
            clowee_share: Rate::from_bps(4000),
            electricity_cost: Money::from_major(100),
            maintenance_percentage: None,
            payment_duration: PaymentDuration::Monthly,
        }
    }

    pub(crate) async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// A file-backed database whose pool really hands out several
    /// connections. Remove the returned directory when done.
    pub(crate) async fn file_db(max_connections: u32) -> (Database, PathBuf) {
        let dir = std::env::temp_dir().join(format!("clowee-db-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = DbConfig::new(dir.join("clowee.db"))
            .max_connections(max_connections)
            .min_connections(max_connections);
        (Database::new(config).await.unwrap(), dir)
    }

    /// A database holding one franchise with one active machine.
    pub(crate) async fn db_with_machine() -> (Database, Franchise, Machine) {
        let db = db().await;
        let franchise = db.franchises().create("Bashundhara City", terms()).await.unwrap();
        let machine = db
            .machines()
            .create(&franchise.id, "Claw A", "BC-0001", Some("Level 4"))
            .await
            .unwrap();
        (db, franchise, machine)
    }
}
