//! # Billing Periods
//!
//! A machine gets exactly one sale per billing period. The period length
//! comes from the franchise's [`PaymentDuration`].
//!
//! ```text
//! Monthly        │◄──────────────── 2026-10 ────────────────►│
//!                1                                           31
//! HalfMonthly    │◄──── 2026-10-H1 ────►│◄──── 2026-10-H2 ───►│
//!                1                     15 16                 31
//! ```

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{PaymentDuration, Sale};

/// Last day of the first half of a month.
const FIRST_HALF_LAST_DAY: u32 = 15;

// =============================================================================
// Billing Period
// =============================================================================

/// An inclusive span of days billed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillingPeriod {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
    pub duration: PaymentDuration,
}

impl BillingPeriod {
    /// The period that `date` falls in.
    pub fn containing(date: NaiveDate, duration: PaymentDuration) -> Self {
        let month_start = date - Duration::days(date.day0() as i64);
        let month_end = month_start + Duration::days(days_in_month(date.year(), date.month()) as i64 - 1);

        let (start, end) = match duration {
            PaymentDuration::Monthly => (month_start, month_end),
            PaymentDuration::HalfMonthly if date.day() <= FIRST_HALF_LAST_DAY => (
                month_start,
                month_start + Duration::days(FIRST_HALF_LAST_DAY as i64 - 1),
            ),
            PaymentDuration::HalfMonthly => (
                month_start + Duration::days(FIRST_HALF_LAST_DAY as i64),
                month_end,
            ),
        };

        BillingPeriod { start, end, duration }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Stable key for storage and display: `2026-10`, `2026-10-H1`, `2026-10-H2`.
    pub fn key(&self) -> String {
        let month = self.start.format("%Y-%m");
        match self.duration {
            PaymentDuration::Monthly => month.to_string(),
            PaymentDuration::HalfMonthly if self.start.day() == 1 => format!("{month}-H1"),
            PaymentDuration::HalfMonthly => format!("{month}-H2"),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

// =============================================================================
// Duplicate-Period Rule
// =============================================================================

/// Rejects a sale for `machine_id` on `date` when another sale of that
/// machine already sits in the same billing period.
///
/// `exclude_sale_id` lets an edit keep its own slot.
pub fn ensure_no_duplicate_period(
    existing: &[Sale],
    machine_id: &str,
    date: NaiveDate,
    duration: PaymentDuration,
    exclude_sale_id: Option<&str>,
) -> CoreResult<()> {
    let period = BillingPeriod::containing(date, duration);

    let clash = existing.iter().find(|sale| {
        sale.machine_id == machine_id
            && Some(sale.id.as_str()) != exclude_sale_id
            && period.contains(sale.sales_date)
    });

    match clash {
        Some(sale) => Err(CoreError::DuplicateBillingPeriod {
            machine_id: machine_id.to_string(),
            period: period.key(),
            existing_sale_id: sale.id.clone(),
        }),
        None => Ok(()),
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive `from..=to` range used for invoices and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedRange {
                field: "date range".to_string(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(DateRange { from, to })
    }

    /// Range covering exactly one billing period.
    pub fn from_period(period: &BillingPeriod) -> Self {
        DateRange {
            from: period.start,
            to: period.end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::SaleStatus;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(id: &str, machine_id: &str, sales_date: NaiveDate) -> Sale {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Sale {
            id: id.to_string(),
            machine_id: machine_id.to_string(),
            franchise_id: "f1".to_string(),
            sales_date,
            billing_period: String::new(),
            coin_sales: 0,
            prize_out_quantity: 0,
            agreement_id: None,
            sales_amount: Money::zero(),
            prize_out_cost: Money::zero(),
            vat_amount: Money::zero(),
            net_sales_amount: Money::zero(),
            maintenance_amount: Money::zero(),
            clowee_profit: Money::zero(),
            franchise_profit: Money::zero(),
            electricity_cost: Money::zero(),
            pay_to_clowee: Money::zero(),
            status: SaleStatus::Recorded,
            notes: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_monthly_period_bounds() {
        let p = BillingPeriod::containing(date(2026, 10, 18), PaymentDuration::Monthly);
        assert_eq!(p.start, date(2026, 10, 1));
        assert_eq!(p.end, date(2026, 10, 31));
        assert_eq!(p.key(), "2026-10");
    }

    #[test]
    fn test_february_bounds() {
        let leap = BillingPeriod::containing(date(2024, 2, 10), PaymentDuration::Monthly);
        assert_eq!(leap.end, date(2024, 2, 29));

        let common = BillingPeriod::containing(date(2026, 2, 20), PaymentDuration::HalfMonthly);
        assert_eq!(common.start, date(2026, 2, 16));
        assert_eq!(common.end, date(2026, 2, 28));

        let century = BillingPeriod::containing(date(2100, 2, 1), PaymentDuration::Monthly);
        assert_eq!(century.end, date(2100, 2, 28));
    }

    #[test]
    fn test_half_month_bounds() {
        let first = BillingPeriod::containing(date(2026, 10, 15), PaymentDuration::HalfMonthly);
        assert_eq!((first.start, first.end), (date(2026, 10, 1), date(2026, 10, 15)));
        assert_eq!(first.key(), "2026-10-H1");

        let second = BillingPeriod::containing(date(2026, 10, 16), PaymentDuration::HalfMonthly);
        assert_eq!((second.start, second.end), (date(2026, 10, 16), date(2026, 10, 31)));
        assert_eq!(second.key(), "2026-10-H2");
    }

    #[test]
    fn test_monthly_duplicate_conflicts() {
        let existing = vec![sale("s1", "m1", date(2026, 10, 5))];

        let err = ensure_no_duplicate_period(&existing, "m1", date(2026, 10, 28), PaymentDuration::Monthly, None)
            .unwrap_err();
        match err {
            CoreError::DuplicateBillingPeriod { period, existing_sale_id, .. } => {
                assert_eq!(period, "2026-10");
                assert_eq!(existing_sale_id, "s1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_half_month_different_halves_do_not_conflict() {
        let existing = vec![sale("s1", "m1", date(2026, 10, 10))];

        assert!(ensure_no_duplicate_period(
            &existing,
            "m1",
            date(2026, 10, 20),
            PaymentDuration::HalfMonthly,
            None
        )
        .is_ok());
        assert!(ensure_no_duplicate_period(
            &existing,
            "m1",
            date(2026, 10, 1),
            PaymentDuration::HalfMonthly,
            None
        )
        .is_err());
    }

    #[test]
    fn test_other_machines_and_excluded_sale_do_not_conflict() {
        let existing = vec![sale("s1", "m1", date(2026, 10, 5))];

        assert!(ensure_no_duplicate_period(&existing, "m2", date(2026, 10, 6), PaymentDuration::Monthly, None).is_ok());
        assert!(
            ensure_no_duplicate_period(&existing, "m1", date(2026, 10, 6), PaymentDuration::Monthly, Some("s1"))
                .is_ok()
        );
    }

    #[test]
    fn test_date_range() {
        assert!(DateRange::new(date(2026, 10, 2), date(2026, 10, 1)).is_err());

        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 31)).unwrap();
        assert!(range.contains(date(2026, 10, 1)));
        assert!(range.contains(date(2026, 10, 31)));
        assert!(!range.contains(date(2026, 11, 1)));
    }
}
