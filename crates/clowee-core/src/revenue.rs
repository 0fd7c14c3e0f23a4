//! # Revenue-Share Calculator
//!
//! Turns one billing period's counter deltas into the franchise / operator
//! split.
//!
//! ## Calculation Flow
//! ```text
//! coin_sales × coin_price ──► sales_amount
//!                                 │  − VAT
//!                                 ▼
//!                           net_sales_amount
//!                                 │  − prize_out × doll_price
//!                                 ▼
//!                           net_after_prize
//!                                 │  − maintenance (if any, on profit only)
//!                                 ▼
//!                            profit pool ──┬──► × clowee_share    = clowee_profit
//!                                          └──► × franchise_share = franchise_profit
//!
//! pay_to_clowee = max(0, clowee_profit + prize_out_cost + maintenance − electricity)
//! ```
//!
//! A loss-making period carries negative values all the way to the split;
//! only the payable is floored, so the franchise's side absorbs the loss.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::PricingTerms;

/// Figures for one billing period of one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShareResult {
    pub sales_amount: Money,
    pub prize_out_cost: Money,
    pub vat_amount: Money,
    pub net_sales_amount: Money,
    pub net_after_prize: Money,
    pub maintenance_amount: Money,
    pub clowee_profit: Money,
    pub franchise_profit: Money,
    pub pay_to_clowee: Money,
}

/// Computes the revenue share for `coin_sales` plays and `prize_out` prizes.
///
/// ```rust
/// use clowee_core::money::Money;
/// use clowee_core::revenue::calculate;
/// use clowee_core::types::{PaymentDuration, PricingTerms, Rate};
///
/// let terms = PricingTerms {
///     coin_price: Money::from_major(5),
///     doll_price: Money::from_major(25),
///     vat_percentage: Rate::from_bps(750),
///     franchise_share: Rate::from_bps(6000),
///     clowee_share: Rate::from_bps(4000),
///     electricity_cost: Money::from_major(500),
///     maintenance_percentage: None,
///     payment_duration: PaymentDuration::Monthly,
/// };
///
/// let r = calculate(100, 10, &terms);
/// assert_eq!(r.sales_amount, Money::from_major(500));
/// assert_eq!(r.vat_amount, Money::from_minor(3750));
/// assert_eq!(r.net_after_prize, Money::from_minor(21250));
/// assert_eq!(r.pay_to_clowee, Money::zero());
/// ```
pub fn calculate(coin_sales: i64, prize_out: i64, terms: &PricingTerms) -> ShareResult {
    let sales_amount = terms.coin_price.multiply_quantity(coin_sales);
    let prize_out_cost = terms.doll_price.multiply_quantity(prize_out);
    let vat_amount = sales_amount.apply_rate(terms.vat_percentage);
    let net_sales_amount = sales_amount - vat_amount;
    let net_after_prize = net_sales_amount - prize_out_cost;

    // Maintenance is a cut of profit; a loss has nothing to cut.
    let maintenance_amount = match terms.maintenance() {
        Some(rate) if net_after_prize.is_positive() => net_after_prize.apply_rate(rate),
        _ => Money::zero(),
    };
    let profit_pool = net_after_prize - maintenance_amount;

    let clowee_profit = profit_pool.apply_rate(terms.clowee_share);
    let franchise_profit = profit_pool.apply_rate(terms.franchise_share);

    let pay_to_clowee =
        (clowee_profit + prize_out_cost + maintenance_amount - terms.electricity_cost).floor_zero();

    ShareResult {
        sales_amount,
        prize_out_cost,
        vat_amount,
        net_sales_amount,
        net_after_prize,
        maintenance_amount,
        clowee_profit,
        franchise_profit,
        pay_to_clowee,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
