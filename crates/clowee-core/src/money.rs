//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Revenue share is a chain of percentages:                               │
//! │                                                                         │
//! │    sales × VAT% → net − prize cost → × share%                          │
//! │                                                                         │
//! │  With floats every step drifts; summed over a year of invoices the     │
//! │  franchise and the operator disagree by a few poisha.                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer poisha (1/100 taka), one rounding per step      │
//! │    ৳462.50 × 40% = 46250 × 4000 / 10000 = 18500 poisha                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use clowee_core::money::Money;
//! use clowee_core::types::Rate;
//!
//! let coin = Money::from_major(5);              // ৳5.00
//! let sales = coin * 100_i64;                   // ৳500.00
//! let vat = sales.apply_rate(Rate::from_bps(750));
//! assert_eq!(vat, Money::from_minor(3750));     // ৳37.50
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;
use crate::FULL_RATE_BPS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in poisha (1/100 taka).
///
/// ## Design Decisions
/// - **i64 (signed)**: loss-making periods produce negative profits
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent sqlx type**: stored as a plain INTEGER column
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from poisha.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole taka.
    ///
    /// ```rust
    /// use clowee_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(25).minor(), 2500);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from taka and poisha.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -৳5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in poisha.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole-taka portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the poisha portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the value, or zero when it is negative.
    ///
    /// ```rust
    /// use clowee_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(-1).floor_zero(), Money::zero());
    /// assert_eq!(Money::from_minor(42).floor_zero(), Money::from_minor(42));
    /// ```
    #[inline]
    pub fn floor_zero(self) -> Self {
        Money(self.0.max(0))
    }

    /// Multiplies by a count (coins played, prizes dispensed). Saturates at
    /// the `i64` bounds instead of overflowing.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Takes a percentage of this amount.
    ///
    /// Rounds half away from zero to the nearest poisha, so a loss of
    /// ৳-0.005 becomes ৳-0.01 exactly as a gain of ৳0.005 becomes ৳0.01.
    ///
    /// ```rust
    /// use clowee_core::money::Money;
    /// use clowee_core::types::Rate;
    ///
    /// let net = Money::from_minor(21250);      // ৳212.50
    /// let share = net.apply_rate(Rate::from_bps(4000));
    /// assert_eq!(share, Money::from_major(85));
    ///
    /// let loss = Money::from_minor(-1005);
    /// assert_eq!(loss.apply_rate(Rate::from_bps(5000)).minor(), -503);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 keeps large aggregates from overflowing before the division
        let scaled = self.0 as i128 * rate.bps() as i128;
        let full = FULL_RATE_BPS as i128;
        let half = full / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / full
        } else {
            (scaled - half) / full
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display for logs and CLI output: `৳1234.50`, `-৳5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}৳{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "৳10.99");
        assert_eq!(Money::from_minor(500).to_string(), "৳5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-৳5.50");
        assert_eq!(Money::zero().to_string(), "৳0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((b - a).minor(), -500);
        assert_eq!((a * 3_i64).minor(), 3000);
        assert_eq!((-a).minor(), -1000);
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let huge = Money::from_minor(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(1_000_000).minor(), i64::MAX);
        assert_eq!((-huge).multiply_quantity(3).minor(), i64::MIN);
    }

    #[test]
    fn test_apply_rate_exact() {
        // ৳500.00 at 7.5% = ৳37.50
        let vat = Money::from_major(500).apply_rate(Rate::from_bps(750));
        assert_eq!(vat.minor(), 3750);
    }

    #[test]
    fn test_apply_rate_rounds_half_away_from_zero() {
        // 1005 × 50% = 502.5 → 503
        assert_eq!(Money::from_minor(1005).apply_rate(Rate::from_bps(5000)).minor(), 503);
        assert_eq!(Money::from_minor(-1005).apply_rate(Rate::from_bps(5000)).minor(), -503);
        // 1004 × 50% = 502 exactly
        assert_eq!(Money::from_minor(1004).apply_rate(Rate::from_bps(5000)).minor(), 502);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_minor(-250).floor_zero(), Money::zero());
        assert_eq!(Money::from_minor(250).floor_zero().minor(), 250);
    }

    #[test]
    fn test_sum() {
        let values = [Money::from_minor(100), Money::from_minor(-30), Money::from_minor(5)];
        let total: Money = values.iter().sum();
        assert_eq!(total.minor(), 75);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::from_minor(1234)).unwrap();
        assert_eq!(json, "1234");
    }
}
