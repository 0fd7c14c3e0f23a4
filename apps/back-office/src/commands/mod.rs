//! # Back-office Commands
//!
//! Each command returns plain data; [`emit`] turns it into the text or JSON
//! the operator sees.
//!
//! ```text
//! commands/
//! ├── agreement.rs  ◄─── add-agreement
//! ├── franchise.rs  ◄─── franchises
//! ├── sale.rs       ◄─── record-sale, pay
//! └── invoice.rs    ◄─── invoice
//! ```

pub mod agreement;
pub mod franchise;
pub mod invoice;
pub mod sale;

use serde::Serialize;

use crate::error::CliError;

/// Renders `value` as pretty JSON or through `text`.
pub fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<String, CliError> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text(value))
    }
}

/// Shared setup for command tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use clowee_core::types::{Franchise, Machine, PaymentDuration, PricingTerms, Rate};
    use clowee_core::Money;
    use clowee_db::{Database, DbConfig};

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

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

    pub(crate) async fn setup() -> (Database, Franchise, Machine) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let franchise = db.franchises().create("Bashundhara City", terms()).await.unwrap();
        let machine = db
            .machines()
            .create(&franchise.id, "Claw A", "BC-0001", None)
            .await
            .unwrap();
        (db, franchise, machine)
    }
}
