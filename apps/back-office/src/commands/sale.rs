//! # Sale Commands

use chrono::NaiveDate;
use std::fmt::Write;
use tracing::{debug, info};

use crate::error::CliError;
use clowee_core::sale::SaleDraft;
use clowee_core::types::{PaymentMethod, Sale};
use clowee_core::validation::{coerce_count, parse_amount, validate_uuid};
use clowee_db::{Database, NewPayment, PaymentReceipt};

#[derive(Debug, Clone)]
pub struct RecordSaleArgs {
    pub machine_id: String,
    pub date: NaiveDate,
    pub coins: Option<String>,
    pub prizes: Option<String>,
    pub notes: Option<String>,
}

/// Records a sale. Blank or unparseable counters count as zero.
pub async fn record(db: &Database, args: RecordSaleArgs) -> Result<Sale, CliError> {
    debug!(machine_id = %args.machine_id, date = %args.date, "record-sale command");
    validate_uuid("machine_id", &args.machine_id)?;

    let draft = SaleDraft {
        machine_id: args.machine_id,
        sales_date: args.date,
        coin_sales: coerce_count(args.coins.as_deref()),
        prize_out_quantity: coerce_count(args.prizes.as_deref()),
        notes: args.notes.filter(|n| !n.trim().is_empty()),
    };

    let sale = db.sales().record(draft).await?;
    info!(sale_id = %sale.id, "Sale recorded");
    Ok(sale)
}

pub fn render_sale(sale: &Sale) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sale {} ({}, period {})", sale.id, sale.status, sale.billing_period);
    let _ = writeln!(out, "  machine        {}", sale.machine_id);
    let _ = writeln!(out, "  date           {}", sale.sales_date);
    let _ = writeln!(out, "  coins / prizes {} / {}", sale.coin_sales, sale.prize_out_quantity);
    let _ = writeln!(out, "  sales          {:>14}", sale.sales_amount.to_string());
    let _ = writeln!(out, "  VAT            {:>14}", sale.vat_amount.to_string());
    let _ = writeln!(out, "  prize cost     {:>14}", sale.prize_out_cost.to_string());
    if !sale.maintenance_amount.is_zero() {
        let _ = writeln!(out, "  maintenance    {:>14}", sale.maintenance_amount.to_string());
    }
    let _ = writeln!(out, "  franchise      {:>14}", sale.franchise_profit.to_string());
    let _ = writeln!(out, "  clowee         {:>14}", sale.clowee_profit.to_string());
    let _ = writeln!(out, "  electricity    {:>14}", sale.electricity_cost.to_string());
    let _ = writeln!(out, "  pay to Clowee  {:>14}", sale.pay_to_clowee.to_string());
    out
}

#[derive(Debug, Clone)]
pub struct PayArgs {
    pub sale_id: String,
    /// Taka as typed by the operator.
    pub amount: String,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_on: NaiveDate,
}

pub async fn pay(db: &Database, args: PayArgs) -> Result<PaymentReceipt, CliError> {
    debug!(sale_id = %args.sale_id, "pay command");
    validate_uuid("sale_id", &args.sale_id)?;

    let amount = parse_amount(&args.amount)?;
    let receipt = db
        .sales()
        .add_payment(NewPayment {
            sale_id: args.sale_id,
            amount,
            method: args.method,
            reference: args.reference,
            paid_on: args.paid_on,
        })
        .await?;

    Ok(receipt)
}

pub fn render_receipt(receipt: &PaymentReceipt) -> String {
    format!(
        "Payment {} of {} by {} recorded\n  sale {} is {} | paid {} | outstanding {}\n",
        receipt.payment.id,
        receipt.payment.amount,
        receipt.payment.method,
        receipt.payment.sale_id,
        receipt.sale_status,
        receipt.total_paid,
        receipt.outstanding,
    )
}
