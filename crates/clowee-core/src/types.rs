//! # Domain Types
//!
//! Core domain types used throughout Clowee ERP.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Franchise     │◄──│   Agreement     │   │  PricingTerms   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  effective_date │   │  coin_price     │       │
//! │  │  terms (dflt)   │   │  terms          │   │  doll_price     │       │
//! │  └────────▲────────┘   └─────────────────┘   │  vat / shares   │       │
//! │           │                                  │  electricity    │       │
//! │  ┌────────┴────────┐   ┌─────────────────┐   └─────────────────┘       │
//! │  │    Machine      │◄──│      Sale       │◄──┌─────────────────┐       │
//! │  │  ─────────────  │   │  ─────────────  │   │    Payment      │       │
//! │  │  serial_number  │   │  coin_sales     │   │  amount, method │       │
//! │  │  location       │   │  prize_out      │   └─────────────────┘       │
//! │  └─────────────────┘   │  money snapshot │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A [`Sale`] stores the money figures computed from the terms in force on its
//! sales date. Editing a franchise or adding an agreement later never changes
//! an already recorded sale.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::FULL_RATE_BPS;

// =============================================================================
// Rate
// =============================================================================

/// A percentage in basis points (bps).
///
/// 1 basis point = 0.01%, so 750 bps = 7.5% VAT and 4000 bps = 40% share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// One hundred percent.
    #[inline]
    pub const fn full() -> Self {
        Rate(FULL_RATE_BPS)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Payment Duration
// =============================================================================

/// How often a franchise is billed.
///
/// Also decides how many sales a machine may have per month: one for
/// `Monthly`, one per half for `HalfMonthly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDuration {
    /// One billing period per calendar month.
    #[default]
    Monthly,
    /// Two billing periods per month: days 1-15 and 16-end.
    HalfMonthly,
}

impl PaymentDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDuration::Monthly => "monthly",
            PaymentDuration::HalfMonthly => "half_monthly",
        }
    }
}

impl fmt::Display for PaymentDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pricing Terms
// =============================================================================

/// Revenue-share terms shared by franchise defaults and agreements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PricingTerms {
    /// Price of one play (one coin).
    pub coin_price: Money,

    /// Cost of one dispensed prize.
    pub doll_price: Money,

    /// VAT taken off gross sales.
    pub vat_percentage: Rate,

    /// Franchise's share of the profit pool.
    pub franchise_share: Rate,

    /// Operator's share of the profit pool.
    pub clowee_share: Rate,

    /// Electricity bill deducted from the payable, per billing period.
    pub electricity_cost: Money,

    /// Maintenance fee collected on the operator's behalf.
    pub maintenance_percentage: Option<Rate>,

    pub payment_duration: PaymentDuration,
}

impl PricingTerms {
    /// Maintenance rate when one applies (present and non-zero).
    pub fn maintenance(&self) -> Option<Rate> {
        self.maintenance_percentage.filter(|rate| !rate.is_zero())
    }
}

// =============================================================================
// Franchise
// =============================================================================

/// A partner location hosting machines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Franchise {
    pub id: String,

    /// Display name, unique across franchises.
    pub name: String,

    /// Default terms, used when no agreement is in effect.
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub terms: PricingTerms,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Agreement
// =============================================================================

/// Dated terms superseding the franchise defaults from `effective_date` on.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Agreement {
    pub id: String,
    pub franchise_id: String,
    #[ts(as = "String")]
    pub effective_date: NaiveDate,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub terms: PricingTerms,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Machine
// =============================================================================

/// A claw machine placed at a franchise.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Machine {
    pub id: String,
    pub franchise_id: String,
    pub name: String,
    /// Manufacturer serial, unique across the fleet.
    pub serial_number: String,
    pub location: Option<String>,
    #[ts(as = "Option<String>")]
    pub installed_on: Option<NaiveDate>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Counter Reading
// =============================================================================

/// Cumulative coin and prize counters read off a machine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CounterReading {
    pub id: String,
    pub machine_id: String,
    #[ts(as = "String")]
    pub reading_date: NaiveDate,
    pub coin_counter: i64,
    pub prize_counter: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// Lifecycle of a sale.
///
/// ```text
/// Draft ──record──► Recorded ──payments cover payable──► Paid
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Entered by an operator, not yet validated.
    #[default]
    Draft,
    /// Figures computed and persisted.
    Recorded,
    /// Payments cover the payable amount.
    Paid,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Draft => "draft",
            SaleStatus::Recorded => "recorded",
            SaleStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One billing period of one machine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub machine_id: String,
    pub franchise_id: String,
    #[ts(as = "String")]
    pub sales_date: NaiveDate,
    /// Period key, e.g. `2026-10` or `2026-10-H2`.
    pub billing_period: String,
    pub coin_sales: i64,
    pub prize_out_quantity: i64,
    /// Agreement whose terms produced the figures; `None` for franchise defaults.
    pub agreement_id: Option<String>,
    pub sales_amount: Money,
    pub prize_out_cost: Money,
    pub vat_amount: Money,
    pub net_sales_amount: Money,
    pub maintenance_amount: Money,
    pub clowee_profit: Money,
    pub franchise_profit: Money,
    pub electricity_cost: Money,
    pub pay_to_clowee: Money,
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    /// bKash, Nagad and similar wallets.
    MobileBanking,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::MobileBanking => "mobile_banking",
            PaymentMethod::Cheque => "cheque",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Money received from a franchise against a sale's payable.
/// A sale may be settled by several partial payments.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub sale_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    /// Bank reference, transaction id, cheque number.
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub paid_on: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
