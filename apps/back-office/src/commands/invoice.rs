//! # Invoice Command

use chrono::NaiveDate;
use std::fmt::Write;
use tracing::debug;

use crate::error::CliError;
use clowee_core::invoice::{ConsolidatedTotals, FranchiseInvoice};
use clowee_core::period::DateRange;
use clowee_core::validation::validate_uuid;
use clowee_db::Database;

pub async fn build(db: &Database, franchise_id: &str, from: NaiveDate, to: NaiveDate) -> Result<FranchiseInvoice, CliError> {
    debug!(%franchise_id, %from, %to, "invoice command");
    validate_uuid("franchise_id", franchise_id)?;

    let range = DateRange::new(from, to)?;
    Ok(db.invoices().build(franchise_id, range).await?)
}

fn totals_row(out: &mut String, label: &str, t: &ConsolidatedTotals) {
    let _ = writeln!(
        out,
        "{:<38} {:>5} {:>8} {:>14} {:>14} {:>14} {:>14}",
        label,
        t.sale_count,
        t.coin_sales,
        t.sales_amount.to_string(),
        t.franchise_profit.to_string(),
        t.clowee_profit.to_string(),
        t.pay_to_clowee.to_string(),
    );
}

pub fn render(invoice: &FranchiseInvoice) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Invoice {}", invoice.invoice_number);
    let _ = writeln!(out, "{} ({})", invoice.franchise_name, invoice.franchise_id);
    let _ = writeln!(out, "Period {} to {}", invoice.range.from, invoice.range.to);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<38} {:>5} {:>8} {:>14} {:>14} {:>14} {:>14}",
        "machine", "sales", "coins", "sales amount", "franchise", "clowee", "payable"
    );
    for machine in &invoice.report.machines {
        totals_row(&mut out, &machine.machine_id, &machine.totals);
    }
    totals_row(&mut out, "TOTAL", &invoice.report.totals);

    let totals = &invoice.report.totals;
    let _ = writeln!(out);
    let _ = writeln!(out, "VAT            {}", totals.vat_amount);
    let _ = writeln!(out, "Prize cost     {}", totals.prize_out_cost);
    if !totals.maintenance_amount.is_zero() {
        let _ = writeln!(out, "Maintenance    {}", totals.maintenance_amount);
    }
    let _ = writeln!(out, "Electricity    {}", totals.electricity_cost);
    let _ = writeln!(out, "Payable        {}", totals.pay_to_clowee);
    let _ = writeln!(out, "Paid           {}", invoice.total_paid);
    let _ = writeln!(out, "Amount due     {}", invoice.amount_due);
    out
}
