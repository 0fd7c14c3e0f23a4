//! # Sale Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. DRAFT                                                              │
//! │     └── SaleDraft { machine, date, coin_sales, prize_out }             │
//! │                                                                         │
//! │  2. RECORD                                                             │
//! │     └── record_sale()                                                  │
//! │         ├── machine belongs to franchise and is active                 │
//! │         ├── no other sale in the billing period                        │
//! │         └── terms resolved for the date → figures frozen on the sale  │
//! │                                                                         │
//! │  3. (OPTIONAL) EDIT                                                    │
//! │     └── edit_sale() → recompute from terms effective on the new date  │
//! │                                                                         │
//! │  4. PAID                                                               │
//! │     └── settlement_status() once payments cover pay_to_clowee          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::agreement::effective_terms;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::period::{ensure_no_duplicate_period, BillingPeriod};
use crate::revenue::{calculate, ShareResult};
use crate::types::{Agreement, CounterReading, Franchise, Machine, PricingTerms, Sale, SaleStatus};
use crate::validation::validate_counter;

// =============================================================================
// Inputs
// =============================================================================

/// Operator input for a new sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    pub machine_id: String,
    #[ts(as = "String")]
    pub sales_date: NaiveDate,
    pub coin_sales: i64,
    pub prize_out_quantity: i64,
    pub notes: Option<String>,
}

impl SaleDraft {
    /// Builds a draft from two counter readings of the same machine.
    ///
    /// The sale is dated on the `current` reading. A counter that went
    /// backwards (board reset, mistyped reading) is rejected rather than
    /// turned into a negative sale.
    pub fn from_readings(previous: &CounterReading, current: &CounterReading) -> CoreResult<Self> {
        let coin_sales = counter_delta("coin", previous.coin_counter, current.coin_counter)?;
        let prize_out_quantity = counter_delta("prize", previous.prize_counter, current.prize_counter)?;

        Ok(SaleDraft {
            machine_id: current.machine_id.clone(),
            sales_date: current.reading_date,
            coin_sales,
            prize_out_quantity,
            notes: None,
        })
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_counter("coin_sales", self.coin_sales)?;
        validate_counter("prize_out_quantity", self.prize_out_quantity)?;
        Ok(())
    }
}

fn counter_delta(counter: &str, previous: i64, current: i64) -> CoreResult<i64> {
    if current < previous {
        return Err(CoreError::CounterRegression {
            counter: counter.to_string(),
            previous,
            current,
        });
    }
    Ok(current - previous)
}

/// Changes to a recorded sale. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleEdit {
    #[ts(as = "Option<String>")]
    pub sales_date: Option<NaiveDate>,
    pub coin_sales: Option<i64>,
    pub prize_out_quantity: Option<i64>,
    pub notes: Option<String>,
}

/// Everything needed to record or edit a sale of one machine.
#[derive(Debug, Clone, Copy)]
pub struct SaleContext<'a> {
    pub franchise: &'a Franchise,
    pub machine: &'a Machine,
    /// The franchise's agreements, any order.
    pub agreements: &'a [Agreement],
    /// Sales of the machine that may share a billing period with the new date.
    pub existing_sales: &'a [Sale],
}

impl SaleContext<'_> {
    fn check_machine(&self) -> CoreResult<()> {
        if self.machine.franchise_id != self.franchise.id {
            return Err(CoreError::FranchiseMismatch {
                machine_id: self.machine.id.clone(),
                franchise_id: self.franchise.id.clone(),
            });
        }
        if !self.machine.is_active {
            return Err(CoreError::MachineInactive(self.machine.id.clone()));
        }
        Ok(())
    }

    /// Billing period of `date`, cut by the franchise's own payment duration.
    pub fn period_of(&self, date: NaiveDate) -> BillingPeriod {
        BillingPeriod::containing(date, self.franchise.terms.payment_duration)
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Validates a draft and freezes its figures into a [`Sale`].
///
/// `id` and `now` come from the caller so this stays free of clocks and
/// random number generators.
pub fn record_sale(id: String, draft: SaleDraft, ctx: &SaleContext<'_>, now: DateTime<Utc>) -> CoreResult<Sale> {
    draft.validate()?;
    ctx.check_machine()?;

    if draft.machine_id != ctx.machine.id {
        return Err(CoreError::FranchiseMismatch {
            machine_id: draft.machine_id,
            franchise_id: ctx.franchise.id.clone(),
        });
    }

    ensure_no_duplicate_period(
        ctx.existing_sales,
        &ctx.machine.id,
        draft.sales_date,
        ctx.franchise.terms.payment_duration,
        None,
    )?;

    let effective = effective_terms(ctx.franchise, ctx.agreements, draft.sales_date);
    let result = calculate(draft.coin_sales, draft.prize_out_quantity, effective.terms);

    let mut sale = Sale {
        id,
        machine_id: ctx.machine.id.clone(),
        franchise_id: ctx.franchise.id.clone(),
        sales_date: draft.sales_date,
        billing_period: ctx.period_of(draft.sales_date).key(),
        coin_sales: draft.coin_sales,
        prize_out_quantity: draft.prize_out_quantity,
        agreement_id: effective.agreement_id(),
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
        notes: draft.notes,
        created_at: now,
        updated_at: now,
    };
    apply_figures(&mut sale, &result, effective.terms);

    Ok(sale)
}

/// Applies an edit to a recorded sale and recomputes its figures from the
/// terms in force on the (possibly new) sales date.
pub fn edit_sale(sale: &Sale, edit: SaleEdit, ctx: &SaleContext<'_>, now: DateTime<Utc>) -> CoreResult<Sale> {
    if sale.status == SaleStatus::Paid {
        return Err(CoreError::InvalidSaleStatus {
            sale_id: sale.id.clone(),
            current_status: sale.status.to_string(),
        });
    }
    ctx.check_machine()?;

    let mut updated = sale.clone();
    if let Some(date) = edit.sales_date {
        updated.sales_date = date;
    }
    if let Some(coin_sales) = edit.coin_sales {
        validate_counter("coin_sales", coin_sales)?;
        updated.coin_sales = coin_sales;
    }
    if let Some(prize_out) = edit.prize_out_quantity {
        validate_counter("prize_out_quantity", prize_out)?;
        updated.prize_out_quantity = prize_out;
    }
    if edit.notes.is_some() {
        updated.notes = edit.notes;
    }

    ensure_no_duplicate_period(
        ctx.existing_sales,
        &updated.machine_id,
        updated.sales_date,
        ctx.franchise.terms.payment_duration,
        Some(&sale.id),
    )?;

    let effective = effective_terms(ctx.franchise, ctx.agreements, updated.sales_date);
    let result = calculate(updated.coin_sales, updated.prize_out_quantity, effective.terms);

    updated.billing_period = ctx.period_of(updated.sales_date).key();
    updated.agreement_id = effective.agreement_id();
    updated.updated_at = now;
    apply_figures(&mut updated, &result, effective.terms);

    Ok(updated)
}

fn apply_figures(sale: &mut Sale, result: &ShareResult, terms: &PricingTerms) {
    sale.sales_amount = result.sales_amount;
    sale.prize_out_cost = result.prize_out_cost;
    sale.vat_amount = result.vat_amount;
    sale.net_sales_amount = result.net_sales_amount;
    sale.maintenance_amount = result.maintenance_amount;
    sale.clowee_profit = result.clowee_profit;
    sale.franchise_profit = result.franchise_profit;
    sale.electricity_cost = terms.electricity_cost;
    sale.pay_to_clowee = result.pay_to_clowee;
}

/// Status of a recorded sale given what has been paid against it.
///
/// A sale with nothing payable stays `Recorded`: there is no payment to
/// attach to it.
pub fn settlement_status(pay_to_clowee: Money, total_paid: Money) -> SaleStatus {
    if pay_to_clowee.is_positive() && total_paid >= pay_to_clowee {
        SaleStatus::Paid
    } else {
        SaleStatus::Recorded
    }
}

/// Amount still owed on a sale, never negative.
pub fn outstanding(pay_to_clowee: Money, total_paid: Money) -> Money {
    (pay_to_clowee - total_paid).floor_zero()
}

// =============================================================================
// Unit Tests
// =============================================================================
