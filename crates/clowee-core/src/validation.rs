//! # Validation Module
//!
//! Input validation and numeric coercion for back-office forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operator input (CLI / forms)                                 │
//! │  ├── Blank or garbled counters → 0 (coerce_count)                      │
//! │  └── Amounts parsed as decimal taka (parse_amount)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: business rule validation                        │
//! │  ├── Rates within 0-100%, shares not above 100% together               │
//! │  └── Counters non-negative, payments positive                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(machine_id, billing_period)                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{PricingTerms, Rate};
use crate::{FULL_RATE_BPS, MAX_COUNTER_DELTA, MAX_PRICE_MINOR};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a franchise name (1-120 characters).
pub fn validate_franchise_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 120)
}

/// Validates a machine name (1-80 characters).
pub fn validate_machine_name(name: &str) -> ValidationResult<()> {
    validate_text("machine name", name, 80)
}

/// Validates a machine serial number.
///
/// ## Rules
/// - 1 to 40 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use clowee_core::validation::validate_serial_number;
///
/// assert!(validate_serial_number("CLW-2024-017").is_ok());
/// assert!(validate_serial_number("has space").is_err());
/// ```
pub fn validate_serial_number(serial: &str) -> ValidationResult<()> {
    validate_text("serial_number", serial, 40)?;

    if !serial
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "serial_number".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string.
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a rate in basis points (0 to 100%).
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate.bps() > FULL_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: FULL_RATE_BPS as i64,
        });
    }
    Ok(())
}

fn validate_price(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if amount.minor() > MAX_PRICE_MINOR {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_MINOR,
        });
    }
    Ok(())
}

/// Validates a full set of pricing terms.
///
/// ## Rules
/// - Prices and electricity cost are between 0 and [`MAX_PRICE_MINOR`]
/// - Every rate is between 0 and 100%
/// - Franchise and Clowee shares together do not exceed 100%
pub fn validate_pricing_terms(terms: &PricingTerms) -> ValidationResult<()> {
    validate_price("coin_price", terms.coin_price)?;
    validate_price("doll_price", terms.doll_price)?;
    validate_price("electricity_cost", terms.electricity_cost)?;

    validate_rate("vat_percentage", terms.vat_percentage)?;
    validate_rate("franchise_share", terms.franchise_share)?;
    validate_rate("clowee_share", terms.clowee_share)?;
    if let Some(rate) = terms.maintenance_percentage {
        validate_rate("maintenance_percentage", rate)?;
    }

    let combined = terms.franchise_share.bps() + terms.clowee_share.bps();
    if combined > FULL_RATE_BPS {
        return Err(ValidationError::OutOfRange {
            field: "franchise_share + clowee_share".to_string(),
            min: 0,
            max: FULL_RATE_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a counter delta (coin sales or prize out).
pub fn validate_counter(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if value > MAX_COUNTER_DELTA {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_COUNTER_DELTA,
        });
    }
    Ok(())
}

/// Validates a payment amount. Zero or negative payments are rejected.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Parsing & Coercion
// =============================================================================

/// Parses a decimal taka amount such as `1250`, `1250.5` or `-12.75`.
///
/// No floating point is involved; more than two decimal places is an error.
///
/// ```rust
/// use clowee_core::validation::parse_amount;
///
/// assert_eq!(parse_amount("462.5").unwrap().minor(), 46250);
/// assert_eq!(parse_amount("৳1,200").unwrap().minor(), 120000);
/// assert!(parse_amount("1.234").is_err());
/// ```
pub fn parse_amount(input: &str) -> ValidationResult<Money> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "amount".to_string(),
        reason: reason.to_string(),
    };

    let cleaned: String = input
        .trim()
        .trim_start_matches('৳')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("must be a decimal number"));
    }
    if fraction.len() > 2 {
        return Err(invalid("at most two decimal places"));
    }

    let major: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("amount too large"))?
    };
    let minor: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid("must be a decimal number"))? * 10,
        _ => fraction.parse().map_err(|_| invalid("must be a decimal number"))?,
    };

    let value = major
        .checked_mul(100)
        .and_then(|v| v.checked_add(minor))
        .ok_or_else(|| invalid("amount too large"))?;

    Ok(Money::from_minor(if negative { -value } else { value }))
}

/// Parses a percentage such as `7.5` or `40%` into a [`Rate`].
///
/// ```rust
/// use clowee_core::validation::parse_rate;
///
/// assert_eq!(parse_rate("7.5").unwrap().bps(), 750);
/// assert_eq!(parse_rate("40%").unwrap().bps(), 4000);
/// ```
pub fn parse_rate(input: &str) -> ValidationResult<Rate> {
    let trimmed = input.trim().trim_end_matches('%');
    // A percentage has the same shape as an amount: two decimals, hundredths.
    let as_amount = parse_amount(trimmed).map_err(|_| ValidationError::InvalidFormat {
        field: "rate".to_string(),
        reason: "must be a percentage with at most two decimal places".to_string(),
    })?;

    let bps = as_amount.minor();
    if !(0..=FULL_RATE_BPS as i64).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(Rate::from_bps(bps as u32))
}

/// Reads a counter field, treating missing or garbled input as zero.
///
/// ```rust
/// use clowee_core::validation::coerce_count;
///
/// assert_eq!(coerce_count(Some("125")), 125);
/// assert_eq!(coerce_count(Some("")), 0);
/// assert_eq!(coerce_count(Some("abc")), 0);
/// assert_eq!(coerce_count(None), 0);
/// ```
pub fn coerce_count(input: Option<&str>) -> i64 {
    input
        .map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0)
}

/// Reads an amount field, treating missing or garbled input as zero.
pub fn coerce_amount(input: Option<&str>) -> Money {
    input
        .and_then(|s| parse_amount(s).ok())
        .unwrap_or_default()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentDuration;

    fn terms() -> PricingTerms {
        PricingTerms {
            coin_price: Money::from_major(5),
            doll_price: Money::from_major(25),
            vat_percentage: Rate::from_bps(750),
            franchise_share: Rate::from_bps(6000),
            clowee_share: Rate::from_bps(4000),
            electricity_cost: Money::from_major(500),
            maintenance_percentage: None,
            payment_duration: PaymentDuration::Monthly,
        }
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_franchise_name("Jamuna Future Park").is_ok());
        assert!(validate_franchise_name("   ").is_err());
        assert!(validate_franchise_name(&"A".repeat(121)).is_err());
        assert!(validate_machine_name("Claw #3").is_ok());
    }

    #[test]
    fn test_validate_serial_number() {
        assert!(validate_serial_number("CLW_001").is_ok());
        assert!(validate_serial_number("").is_err());
        assert!(validate_serial_number("CLW/001").is_err());
        assert!(validate_serial_number(&"A".repeat(41)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_pricing_terms() {
        assert!(validate_pricing_terms(&terms()).is_ok());

        let mut over_shared = terms();
        over_shared.franchise_share = Rate::from_bps(7000);
        assert!(validate_pricing_terms(&over_shared).is_err());

        let mut bad_vat = terms();
        bad_vat.vat_percentage = Rate::from_bps(10_001);
        assert!(validate_pricing_terms(&bad_vat).is_err());

        let mut negative_price = terms();
        negative_price.coin_price = Money::from_minor(-1);
        assert!(validate_pricing_terms(&negative_price).is_err());

        let mut huge_price = terms();
        huge_price.coin_price = Money::from_minor(MAX_PRICE_MINOR + 1);
        assert!(validate_pricing_terms(&huge_price).is_err());

        let mut max_price = terms();
        max_price.electricity_cost = Money::from_minor(MAX_PRICE_MINOR);
        assert!(validate_pricing_terms(&max_price).is_ok());

        let mut bad_maintenance = terms();
        bad_maintenance.maintenance_percentage = Some(Rate::from_bps(20_000));
        assert!(validate_pricing_terms(&bad_maintenance).is_err());
    }

    #[test]
    fn test_validate_counter() {
        assert!(validate_counter("coin_sales", 0).is_ok());
        assert!(validate_counter("coin_sales", 1_500).is_ok());
        assert!(validate_counter("coin_sales", -1).is_err());
        assert!(validate_counter("coin_sales", MAX_COUNTER_DELTA + 1).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(Money::from_minor(1)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
        assert!(validate_payment_amount(Money::from_minor(-100)).is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0").unwrap(), Money::zero());
        assert_eq!(parse_amount("12").unwrap().minor(), 1200);
        assert_eq!(parse_amount("12.5").unwrap().minor(), 1250);
        assert_eq!(parse_amount("12.05").unwrap().minor(), 1205);
        assert_eq!(parse_amount(".5").unwrap().minor(), 50);
        assert_eq!(parse_amount("-12.75").unwrap().minor(), -1275);
        assert_eq!(parse_amount(" 1,000.00 ").unwrap().minor(), 100_000);

        assert!(parse_amount("").is_err());
        assert!(parse_amount("-").is_err());
        assert!(parse_amount("12.345").is_err());
        assert!(parse_amount("1e3").is_err());
        assert!(parse_amount("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("0").unwrap(), Rate::zero());
        assert_eq!(parse_rate("100").unwrap(), Rate::full());
        assert_eq!(parse_rate("12.25%").unwrap().bps(), 1225);
        assert!(parse_rate("100.01").is_err());
        assert!(parse_rate("-1").is_err());
        assert!(parse_rate("abc").is_err());
    }

    #[test]
    fn test_coercion_defaults_to_zero() {
        assert_eq!(coerce_count(Some(" 42 ")), 42);
        assert_eq!(coerce_count(Some("4.2")), 0);
        assert_eq!(coerce_amount(Some("garbage")), Money::zero());
        assert_eq!(coerce_amount(None), Money::zero());
        assert_eq!(coerce_amount(Some("3.5")).minor(), 350);
    }
}
