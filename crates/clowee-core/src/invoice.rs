//! # Franchise Invoices and Reports
//!
//! Sums sales of one franchise into consolidated totals and a per-machine
//! breakdown, two ways:
//!
//! - [`summarize`] adds up the figures stored on each sale. Invoices use it,
//!   so an invoice always agrees with the payable that payments settle.
//! - [`aggregate`] re-runs the calculator for sales covered by an agreement,
//!   which shows the effect of a back-dated agreement before anyone edits
//!   the sales. Sales priced from franchise defaults keep their stored
//!   figures there too, since defaults carry no history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::agreement::{effective_terms, TermsSource};
use crate::money::Money;
use crate::period::DateRange;
use crate::revenue::calculate;
use crate::sale::outstanding;
use crate::types::{Agreement, Franchise, Payment, Sale};

// =============================================================================
// Totals
// =============================================================================

/// Running sums over a set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConsolidatedTotals {
    pub sale_count: u32,
    pub coin_sales: i64,
    pub prize_out_quantity: i64,
    pub sales_amount: Money,
    pub vat_amount: Money,
    pub net_sales_amount: Money,
    pub prize_out_cost: Money,
    pub maintenance_amount: Money,
    pub clowee_profit: Money,
    pub franchise_profit: Money,
    pub electricity_cost: Money,
    pub pay_to_clowee: Money,
}

impl ConsolidatedTotals {
    /// Adds the figures recorded on `sale`.
    fn add_recorded(&mut self, sale: &Sale) {
        self.sale_count += 1;
        self.coin_sales += sale.coin_sales;
        self.prize_out_quantity += sale.prize_out_quantity;
        self.sales_amount += sale.sales_amount;
        self.vat_amount += sale.vat_amount;
        self.net_sales_amount += sale.net_sales_amount;
        self.prize_out_cost += sale.prize_out_cost;
        self.maintenance_amount += sale.maintenance_amount;
        self.clowee_profit += sale.clowee_profit;
        self.franchise_profit += sale.franchise_profit;
        self.electricity_cost += sale.electricity_cost;
        self.pay_to_clowee += sale.pay_to_clowee;
    }

    /// Adds `sale` priced by the agreement in force on its date.
    fn add_recomputed(&mut self, sale: &Sale, franchise: &Franchise, agreements: &[Agreement]) {
        let effective = effective_terms(franchise, agreements, sale.sales_date);
        if effective.source == TermsSource::FranchiseDefault {
            self.add_recorded(sale);
            return;
        }
        let r = calculate(sale.coin_sales, sale.prize_out_quantity, effective.terms);

        self.sale_count += 1;
        self.coin_sales += sale.coin_sales;
        self.prize_out_quantity += sale.prize_out_quantity;
        self.sales_amount += r.sales_amount;
        self.vat_amount += r.vat_amount;
        self.net_sales_amount += r.net_sales_amount;
        self.prize_out_cost += r.prize_out_cost;
        self.maintenance_amount += r.maintenance_amount;
        self.clowee_profit += r.clowee_profit;
        self.franchise_profit += r.franchise_profit;
        self.electricity_cost += effective.terms.electricity_cost;
        self.pay_to_clowee += r.pay_to_clowee;
    }
}

/// Totals for a single machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MachineBreakdown {
    pub machine_id: String,
    pub totals: ConsolidatedTotals,
}

/// Consolidated totals plus per-machine breakdown, ordered by machine id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FranchiseReport {
    pub franchise_id: String,
    pub totals: ConsolidatedTotals,
    pub machines: Vec<MachineBreakdown>,
}

fn group(franchise: &Franchise, sales: &[Sale], add: impl Fn(&mut ConsolidatedTotals, &Sale)) -> FranchiseReport {
    let mut totals = ConsolidatedTotals::default();
    let mut per_machine: BTreeMap<&str, ConsolidatedTotals> = BTreeMap::new();

    for sale in sales.iter().filter(|s| s.franchise_id == franchise.id) {
        add(&mut totals, sale);
        add(per_machine.entry(sale.machine_id.as_str()).or_default(), sale);
    }

    FranchiseReport {
        franchise_id: franchise.id.clone(),
        totals,
        machines: per_machine
            .into_iter()
            .map(|(machine_id, totals)| MachineBreakdown {
                machine_id: machine_id.to_string(),
                totals,
            })
            .collect(),
    }
}

/// Sums the recorded figures of every sale of `franchise` in `sales`.
/// Sales of other franchises are skipped.
pub fn summarize(franchise: &Franchise, sales: &[Sale]) -> FranchiseReport {
    group(franchise, sales, |totals, sale| totals.add_recorded(sale))
}

/// Recomputes every sale of `franchise` in `sales` against the agreement in
/// force on its date. Sales of other franchises are skipped.
pub fn aggregate(franchise: &Franchise, sales: &[Sale], agreements: &[Agreement]) -> FranchiseReport {
    group(franchise, sales, |totals, sale| {
        totals.add_recomputed(sale, franchise, agreements)
    })
}

// =============================================================================
// Invoice
// =============================================================================

/// Invoice for one franchise over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FranchiseInvoice {
    pub invoice_number: String,
    pub franchise_id: String,
    pub franchise_name: String,
    pub range: DateRange,
    /// Recorded figures of the invoiced sales.
    pub report: FranchiseReport,
    pub sale_ids: Vec<String>,
    pub total_paid: Money,
    /// What is still owed, sale by sale, against the recorded payable.
    pub amount_due: Money,
}

impl FranchiseInvoice {
    /// Builds the invoice from sales dated inside `range` and the payments
    /// made against them. Payments for sales outside the range are ignored.
    pub fn build(franchise: &Franchise, range: DateRange, sales: &[Sale], payments: &[Payment]) -> Self {
        let in_range: Vec<Sale> = sales
            .iter()
            .filter(|s| s.franchise_id == franchise.id && range.contains(s.sales_date))
            .cloned()
            .collect();

        let report = summarize(franchise, &in_range);

        let mut total_paid = Money::zero();
        let mut amount_due = Money::zero();
        for sale in &in_range {
            let paid: Money = payments
                .iter()
                .filter(|p| p.sale_id == sale.id)
                .map(|p| p.amount)
                .sum();
            total_paid += paid;
            amount_due += outstanding(sale.pay_to_clowee, paid);
        }

        FranchiseInvoice {
            invoice_number: invoice_number(&franchise.id, &range),
            franchise_id: franchise.id.clone(),
            franchise_name: franchise.name.clone(),
            range,
            report,
            sale_ids: in_range.iter().map(|s| s.id.clone()).collect(),
            total_paid,
            amount_due,
        }
    }
}

/// `INV-<first 8 chars of franchise id, upper-cased>-<from>-<to>`.
fn invoice_number(franchise_id: &str, range: &DateRange) -> String {
    let short: String = franchise_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_ascii_uppercase();
    format!(
        "INV-{}-{}-{}",
        short,
        range.from.format("%Y%m%d"),
        range.to.format("%Y%m%d")
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agreement::tests::{agreement, date, franchise};
    use crate::types::{PaymentMethod, PricingTerms, SaleStatus};
    use chrono::{NaiveDate, TimeZone, Utc};

    /// A sale recorded under `terms`.
    fn sale(id: &str, franchise_id: &str, machine_id: &str, on: NaiveDate, coins: i64, terms: &PricingTerms) -> Sale {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let prizes = coins / 25;
        let r = calculate(coins, prizes, terms);
        Sale {
            id: id.to_string(),
            machine_id: machine_id.to_string(),
            franchise_id: franchise_id.to_string(),
            sales_date: on,
            billing_period: on.format("%Y-%m").to_string(),
            coin_sales: coins,
            prize_out_quantity: prizes,
            agreement_id: None,
            sales_amount: r.sales_amount,
            prize_out_cost: r.prize_out_cost,
            vat_amount: r.vat_amount,
            net_sales_amount: r.net_sales_amount,
            maintenance_amount: r.maintenance_amount,
            clowee_profit: r.clowee_profit,
            franchise_profit: r.franchise_profit,
            electricity_cost: terms.electricity_cost,
            pay_to_clowee: r.pay_to_clowee,
            status: SaleStatus::Recorded,
            notes: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn payment(id: &str, sale_id: &str, taka: i64) -> Payment {
        Payment {
            id: id.to_string(),
            sale_id: sale_id.to_string(),
            amount: Money::from_major(taka),
            method: PaymentMethod::Cash,
            reference: None,
            paid_on: date(2026, 11, 2),
            created_at: Utc.with_ymd_and_hms(2026, 11, 2, 0, 0, 0).unwrap(),
        }
    }

    /// Default test terms with ৳100 electricity: 1000 coins / 40 prizes pay ৳2350.
    fn cheap_power() -> Franchise {
        let mut f = franchise("f1");
        f.terms.electricity_cost = Money::from_major(100);
        f
    }

    #[test]
    fn test_summarize_sums_and_breaks_down_by_machine() {
        let f = cheap_power();
        let sales = vec![
            sale("s2", "f1", "m-b", date(2026, 10, 5), 1000, &f.terms),
            sale("s1", "f1", "m-a", date(2026, 10, 5), 1000, &f.terms),
            sale("s3", "f1", "m-a", date(2026, 11, 5), 1000, &f.terms),
        ];

        let report = summarize(&f, &sales);

        assert_eq!(report.totals.sale_count, 3);
        assert_eq!(report.totals.coin_sales, 3000);
        assert_eq!(report.totals.sales_amount, Money::from_major(15_000));
        assert_eq!(report.totals.electricity_cost, Money::from_major(300));
        assert_eq!(report.totals.pay_to_clowee, Money::from_major(3 * 2350));

        let ids: Vec<&str> = report.machines.iter().map(|m| m.machine_id.as_str()).collect();
        assert_eq!(ids, vec!["m-a", "m-b"]);
        assert_eq!(report.machines[0].totals.sale_count, 2);
        assert_eq!(report.machines[1].totals.pay_to_clowee, Money::from_major(2350));
    }

    #[test]
    fn test_summarize_keeps_recorded_figures_after_terms_change() {
        let mut f = cheap_power();
        let sales = vec![sale("s1", "f1", "m1", date(2026, 10, 5), 1000, &f.terms)];
        f.terms.coin_price = Money::from_major(10);

        let report = summarize(&f, &sales);
        assert_eq!(report.totals.sales_amount, Money::from_major(5000));
        assert_eq!(report.totals.pay_to_clowee, Money::from_major(2350));
    }

    #[test]
    fn test_aggregate_resolves_terms_per_sale_date() {
        let f = franchise("f1");
        let agreements = vec![agreement("a1", "f1", date(2026, 11, 1), 10)];
        let sales = vec![
            sale("s1", "f1", "m1", date(2026, 10, 31), 100, &f.terms),
            // Recorded before the agreement existed.
            sale("s2", "f1", "m1", date(2026, 11, 1), 100, &f.terms),
        ];

        let report = aggregate(&f, &sales, &agreements);
        // 100 × ৳5 + 100 × ৳10
        assert_eq!(report.totals.sales_amount, Money::from_major(1500));
    }

    #[test]
    fn test_aggregate_keeps_default_priced_sales_when_defaults_change() {
        let mut f = cheap_power();
        let sales = vec![sale("s1", "f1", "m1", date(2026, 10, 5), 1000, &f.terms)];
        f.terms.coin_price = Money::from_major(10);
        f.terms.electricity_cost = Money::zero();

        let report = aggregate(&f, &sales, &[]);
        assert_eq!(report.totals, summarize(&f, &sales).totals);
        assert_eq!(report.totals.electricity_cost, Money::from_major(100));
    }

    #[test]
    fn test_aggregate_skips_other_franchises() {
        let f = franchise("f1");
        let sales = vec![
            sale("s1", "f1", "m1", date(2026, 10, 5), 100, &f.terms),
            sale("s2", "f2", "m9", date(2026, 10, 5), 100, &f.terms),
        ];

        let report = aggregate(&f, &sales, &[]);
        assert_eq!(report.totals.sale_count, 1);
        assert_eq!(report.machines.len(), 1);
        assert_eq!(summarize(&f, &sales).totals.sale_count, 1);
    }

    #[test]
    fn test_aggregate_empty() {
        let report = aggregate(&franchise("f1"), &[], &[]);
        assert_eq!(report.totals, ConsolidatedTotals::default());
        assert!(report.machines.is_empty());
    }

    #[test]
    fn test_invoice_filters_range_and_nets_payments() {
        let f = cheap_power();
        let sales = vec![
            sale("s1", "f1", "m1", date(2026, 10, 5), 1000, &f.terms),
            sale("s2", "f1", "m2", date(2026, 10, 20), 1000, &f.terms),
            sale("s3", "f1", "m1", date(2026, 11, 5), 1000, &f.terms),
        ];
        let payments = vec![payment("p1", "s1", 2000), payment("p2", "s3", 999)];
        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 31)).unwrap();

        let invoice = FranchiseInvoice::build(&f, range, &sales, &payments);

        assert_eq!(invoice.sale_ids, vec!["s1".to_string(), "s2".to_string()]);
        assert_eq!(invoice.report.totals.pay_to_clowee, Money::from_major(4700));
        assert_eq!(invoice.total_paid, Money::from_major(2000));
        assert_eq!(invoice.amount_due, Money::from_major(2700));
        assert_eq!(invoice.invoice_number, "INV-F1-20261001-20261031");
    }

    #[test]
    fn test_invoice_due_follows_recorded_payable() {
        let mut f = cheap_power();
        let sales = vec![sale("s1", "f1", "m1", date(2026, 10, 5), 1000, &f.terms)];
        let payments = vec![payment("p1", "s1", 2350)];
        f.terms.coin_price = Money::from_major(10);
        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 31)).unwrap();

        let invoice = FranchiseInvoice::build(&f, range, &sales, &payments);
        assert_eq!(invoice.report.totals.pay_to_clowee, Money::from_major(2350));
        assert_eq!(invoice.amount_due, Money::zero());
    }

    #[test]
    fn test_invoice_overpaid_sale_does_not_cover_another() {
        let f = cheap_power();
        let sales = vec![
            sale("s1", "f1", "m1", date(2026, 10, 5), 1000, &f.terms),
            sale("s2", "f1", "m2", date(2026, 10, 5), 1000, &f.terms),
        ];
        let payments = vec![payment("p1", "s1", 5000)];
        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 31)).unwrap();

        let invoice = FranchiseInvoice::build(&f, range, &sales, &payments);
        assert_eq!(invoice.total_paid, Money::from_major(5000));
        assert_eq!(invoice.amount_due, Money::from_major(2350));
    }

    #[test]
    fn test_invoice_number_is_deterministic() {
        let range = DateRange::new(date(2026, 10, 1), date(2026, 10, 15)).unwrap();
        let a = invoice_number("3f2a9c1e-0000-4000-8000-000000000000", &range);
        let b = invoice_number("3f2a9c1e-0000-4000-8000-000000000000", &range);
        assert_eq!(a, b);
        assert_eq!(a, "INV-3F2A9C1E-20261001-20261015");
    }
}
