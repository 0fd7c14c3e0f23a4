//! # clowee-core: Pure Business Logic for Clowee ERP
//!
//! Revenue-share rules for claw machines placed at franchise locations.
//! Every function here is deterministic and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Clowee ERP Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 back-office (operator CLI)                      │   │
//! │  │    record-sale ──► pay ──► invoice                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    clowee-db (Database Layer)                   │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ clowee-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────────┐   │   │
//! │  │  │ agreement │ │  revenue  │ │  period   │ │    invoice    │   │   │
//! │  │  │  resolve  │ │ calculate │ │ duplicate │ │   aggregate   │   │   │
//! │  │  └───────────┘ └───────────┘ └───────────┘ └───────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Franchise, Agreement, Machine, Sale, Payment)
//! - [`money`] - Money type with integer arithmetic (poisha, no floats)
//! - [`agreement`] - Picks the agreement in effect on a date
//! - [`revenue`] - Revenue-share calculator
//! - [`period`] - Billing periods and the duplicate-period rule
//! - [`sale`] - Sale lifecycle (draft → recorded → paid)
//! - [`invoice`] - Consolidated totals and per-machine breakdowns
//! - [`validation`] - Input validation and numeric coercion
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use clowee_core::money::Money;
//! use clowee_core::revenue::calculate;
//! use clowee_core::types::{PaymentDuration, PricingTerms, Rate};
//!
//! let terms = PricingTerms {
//!     coin_price: Money::from_major(5),
//!     doll_price: Money::from_major(25),
//!     vat_percentage: Rate::from_bps(750),
//!     franchise_share: Rate::from_bps(6000),
//!     clowee_share: Rate::from_bps(4000),
//!     electricity_cost: Money::from_major(500),
//!     maintenance_percentage: None,
//!     payment_duration: PaymentDuration::Monthly,
//! };
//!
//! let result = calculate(100, 10, &terms);
//! assert_eq!(result.clowee_profit, Money::from_major(85));
//! assert!(result.pay_to_clowee.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agreement;
pub mod error;
pub mod invoice;
pub mod money;
pub mod period;
pub mod revenue;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Basis points in one hundred percent.
pub const FULL_RATE_BPS: u32 = 10_000;

/// Upper bound on a single counter delta for one billing period.
///
/// A claw machine plays at most a few thousand games a day; anything above
/// this is a mistyped counter reading rather than real sales.
pub const MAX_COUNTER_DELTA: i64 = 1_000_000;

/// Upper bound on any price or fixed cost in a set of terms, in poisha
/// (৳1,000,000).
///
/// Together with [`MAX_COUNTER_DELTA`] this keeps one period's figures
/// below 10^14 poisha, far from `i64` limits even when summed over years.
pub const MAX_PRICE_MINOR: i64 = 100_000_000;
