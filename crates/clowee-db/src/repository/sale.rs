//! # Sale Repository
//!
//! Database side of the sale lifecycle. The rules themselves live in
//! [`clowee_core::sale`]; this module loads their inputs and stores their
//! outputs inside one transaction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(draft)                                                          │
//! │    BEGIN                                                                │
//! │    ├── machine, franchise, agreements                                   │
//! │    ├── sales of the machine inside the draft's billing period           │
//! │    ├── clowee_core::sale::record_sale  → Sale { status: Recorded }      │
//! │    ├── INSERT  (UNIQUE(machine_id, billing_period) as backstop)         │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  add_payment(payment)                                                   │
//! │    BEGIN                                                                │
//! │    ├── INSERT payment                                                   │
//! │    ├── total paid ≥ pay_to_clowee ?  → status = Paid                    │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::agreement::fetch_agreements;
use crate::repository::franchise::fetch_franchise;
use crate::repository::machine::fetch_machine;
use clowee_core::period::{BillingPeriod, DateRange};
use clowee_core::sale::{edit_sale, outstanding, record_sale, settlement_status, SaleContext, SaleDraft, SaleEdit};
use clowee_core::types::{Payment, PaymentMethod, Sale, SaleStatus};
use clowee_core::validation::validate_payment_amount;
use clowee_core::{CoreError, Money};

macro_rules! select_sales {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT
                id, machine_id, franchise_id, sales_date, billing_period,
                coin_sales, prize_out_quantity, agreement_id,
                sales_amount, prize_out_cost, vat_amount, net_sales_amount,
                maintenance_amount, clowee_profit, franchise_profit,
                electricity_cost, pay_to_clowee,
                status, notes, created_at, updated_at
            FROM sales
            "#,
            $tail
        )
    };
}

/// A payment to record against a sale.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub sale_id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_on: NaiveDate,
}

/// Result of [`SaleRepository::add_payment`].
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub sale_status: SaleStatus,
    pub total_paid: Money,
    pub outstanding: Money,
}

/// Repository for sale and payment database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale for the draft's machine.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown machine or franchise
    /// - `Domain(DuplicateBillingPeriod)` when the period already has a sale,
    ///   also when a concurrent writer got there first
    /// - `Domain(MachineInactive)`, `Domain(Validation(..))`
    pub async fn record(&self, draft: SaleDraft) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let machine = fetch_machine(&mut *tx, &draft.machine_id)
            .await?
            .ok_or_else(|| DbError::not_found("Machine", &draft.machine_id))?;
        let franchise = fetch_franchise(&mut *tx, &machine.franchise_id)
            .await?
            .ok_or_else(|| DbError::not_found("Franchise", &machine.franchise_id))?;
        let agreements = fetch_agreements(&mut *tx, &franchise.id).await?;

        let period = DateRange::from_period(&BillingPeriod::containing(
            draft.sales_date,
            franchise.terms.payment_duration,
        ));
        let existing = fetch_machine_sales(&mut *tx, &machine.id, &period).await?;

        let ctx = SaleContext {
            franchise: &franchise,
            machine: &machine,
            agreements: &agreements,
            existing_sales: &existing,
        };
        let sale = record_sale(Uuid::new_v4().to_string(), draft, &ctx, Utc::now())?;

        debug!(id = %sale.id, machine_id = %sale.machine_id, period = %sale.billing_period, "Inserting sale");
        insert_sale(&mut tx, &sale).await?;

        tx.commit().await?;

        info!(
            id = %sale.id,
            franchise_id = %sale.franchise_id,
            pay_to_clowee = %sale.pay_to_clowee,
            "Sale recorded"
        );
        Ok(sale)
    }

    /// Applies an edit to a recorded (unpaid) sale and stores the recomputed
    /// figures.
    pub async fn edit(&self, sale_id: &str, edit: SaleEdit) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_sale(&mut *tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        let machine = fetch_machine(&mut *tx, &current.machine_id)
            .await?
            .ok_or_else(|| DbError::not_found("Machine", &current.machine_id))?;
        let franchise = fetch_franchise(&mut *tx, &current.franchise_id)
            .await?
            .ok_or_else(|| DbError::not_found("Franchise", &current.franchise_id))?;
        let agreements = fetch_agreements(&mut *tx, &franchise.id).await?;

        let target_date = edit.sales_date.unwrap_or(current.sales_date);
        let period = DateRange::from_period(&BillingPeriod::containing(
            target_date,
            franchise.terms.payment_duration,
        ));
        let existing = fetch_machine_sales(&mut *tx, &machine.id, &period).await?;

        let ctx = SaleContext {
            franchise: &franchise,
            machine: &machine,
            agreements: &agreements,
            existing_sales: &existing,
        };
        let updated = edit_sale(&current, edit, &ctx, Utc::now())?;

        debug!(id = %updated.id, period = %updated.billing_period, "Updating sale");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                sales_date = ?2,
                billing_period = ?3,
                coin_sales = ?4,
                prize_out_quantity = ?5,
                agreement_id = ?6,
                sales_amount = ?7,
                prize_out_cost = ?8,
                vat_amount = ?9,
                net_sales_amount = ?10,
                maintenance_amount = ?11,
                clowee_profit = ?12,
                franchise_profit = ?13,
                electricity_cost = ?14,
                pay_to_clowee = ?15,
                notes = ?16,
                updated_at = ?17
            WHERE id = ?1 AND status != 'paid'
            "#,
        )
        .bind(&updated.id)
        .bind(updated.sales_date)
        .bind(&updated.billing_period)
        .bind(updated.coin_sales)
        .bind(updated.prize_out_quantity)
        .bind(&updated.agreement_id)
        .bind(updated.sales_amount)
        .bind(updated.prize_out_cost)
        .bind(updated.vat_amount)
        .bind(updated.net_sales_amount)
        .bind(updated.maintenance_amount)
        .bind(updated.clowee_profit)
        .bind(updated.franchise_profit)
        .bind(updated.electricity_cost)
        .bind(updated.pay_to_clowee)
        .bind(&updated.notes)
        .bind(updated.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| duplicate_or(err, &updated))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (unpaid)", sale_id));
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        fetch_sale(&self.pool, id).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Sale> {
        self.get_by_id(id).await?.ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Sales of a franchise dated inside `range`, by date then machine.
    pub async fn list_for_franchise(&self, franchise_id: &str, range: &DateRange) -> DbResult<Vec<Sale>> {
        fetch_franchise_sales(&self.pool, franchise_id, range).await
    }

    /// Every sale of a machine, oldest first.
    pub async fn list_for_machine(&self, machine_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(select_sales!(
            r#"
            WHERE machine_id = ?1
            ORDER BY sales_date
            "#
        ))
        .bind(machine_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Records a payment and moves the sale to `Paid` once it is covered.
    ///
    /// Payments larger than what is still owed are rejected.
    pub async fn add_payment(&self, new: NewPayment) -> DbResult<PaymentReceipt> {
        validate_payment_amount(new.amount)?;

        let mut tx = self.pool.begin().await?;

        let sale = fetch_sale(&mut *tx, &new.sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", &new.sale_id))?;
        if sale.status == SaleStatus::Paid {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale.id,
                current_status: sale.status.to_string(),
            }
            .into());
        }

        let paid_before = fetch_total_paid(&mut *tx, &sale.id).await?;
        let owed = outstanding(sale.pay_to_clowee, paid_before);
        if new.amount > owed {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!("{} exceeds the outstanding {}", new.amount, owed),
            }
            .into());
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            sale_id: sale.id.clone(),
            amount: new.amount,
            method: new.method,
            reference: new.reference,
            paid_on: new.paid_on,
            created_at: Utc::now(),
        };

        debug!(sale_id = %payment.sale_id, amount = %payment.amount, "Recording payment");

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, sale_id, amount, method, reference, paid_on, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.sale_id)
        .bind(payment.amount)
        .bind(payment.method)
        .bind(&payment.reference)
        .bind(payment.paid_on)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        let total_paid = paid_before + payment.amount;
        let status = settlement_status(sale.pay_to_clowee, total_paid);
        if status != sale.status {
            sqlx::query("UPDATE sales SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(&sale.id)
                .bind(status)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
            info!(sale_id = %sale.id, status = %status, "Sale settled");
        }

        tx.commit().await?;

        Ok(PaymentReceipt {
            payment,
            sale_status: status,
            total_paid,
            outstanding: outstanding(sale.pay_to_clowee, total_paid),
        })
    }

    /// Payments of a sale, oldest first.
    pub async fn payments(&self, sale_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, sale_id, amount, method, reference, paid_on, created_at
            FROM payments
            WHERE sale_id = ?1
            ORDER BY paid_on, created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    pub async fn total_paid(&self, sale_id: &str) -> DbResult<Money> {
        fetch_total_paid(&self.pool, sale_id).await
    }
}

// =============================================================================
// Shared Queries
// =============================================================================

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO sales (
            id, machine_id, franchise_id, sales_date, billing_period,
            coin_sales, prize_out_quantity, agreement_id,
            sales_amount, prize_out_cost, vat_amount, net_sales_amount,
            maintenance_amount, clowee_profit, franchise_profit,
            electricity_cost, pay_to_clowee,
            status, notes, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9, ?10, ?11, ?12,
            ?13, ?14, ?15,
            ?16, ?17,
            ?18, ?19, ?20, ?21
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.machine_id)
    .bind(&sale.franchise_id)
    .bind(sale.sales_date)
    .bind(&sale.billing_period)
    .bind(sale.coin_sales)
    .bind(sale.prize_out_quantity)
    .bind(&sale.agreement_id)
    .bind(sale.sales_amount)
    .bind(sale.prize_out_cost)
    .bind(sale.vat_amount)
    .bind(sale.net_sales_amount)
    .bind(sale.maintenance_amount)
    .bind(sale.clowee_profit)
    .bind(sale.franchise_profit)
    .bind(sale.electricity_cost)
    .bind(sale.pay_to_clowee)
    .bind(sale.status)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            let err = DbError::from(err);
            if !err.is_unique_on("sales.billing_period") {
                return Err(err);
            }
            // The failed statement is rolled back on its own; the connection
            // can still look up who holds the slot.
            let holder: Option<String> =
                sqlx::query_scalar("SELECT id FROM sales WHERE machine_id = ?1 AND billing_period = ?2")
                    .bind(&sale.machine_id)
                    .bind(&sale.billing_period)
                    .fetch_optional(&mut *conn)
                    .await?;
            Err(duplicate_period(sale, holder.unwrap_or_else(|| "unknown".to_string())))
        }
    }
}

fn duplicate_period(sale: &Sale, existing_sale_id: String) -> DbError {
    CoreError::DuplicateBillingPeriod {
        machine_id: sale.machine_id.clone(),
        period: sale.billing_period.clone(),
        existing_sale_id,
    }
    .into()
}

fn duplicate_or(err: sqlx::Error, sale: &Sale) -> DbError {
    let err = DbError::from(err);
    if err.is_unique_on("sales.billing_period") {
        duplicate_period(sale, "unknown".to_string())
    } else {
        err
    }
}

pub(crate) async fn fetch_sale<'e, E>(executor: E, id: &str) -> DbResult<Option<Sale>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sale = sqlx::query_as::<_, Sale>(select_sales!("WHERE id = ?1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(sale)
}

async fn fetch_machine_sales<'e, E>(executor: E, machine_id: &str, range: &DateRange) -> DbResult<Vec<Sale>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sales = sqlx::query_as::<_, Sale>(select_sales!(
        r#"
        WHERE machine_id = ?1 AND sales_date BETWEEN ?2 AND ?3
        ORDER BY sales_date
        "#
    ))
    .bind(machine_id)
    .bind(range.from)
    .bind(range.to)
    .fetch_all(executor)
    .await?;
    Ok(sales)
}

pub(crate) async fn fetch_franchise_sales<'e, E>(
    executor: E,
    franchise_id: &str,
    range: &DateRange,
) -> DbResult<Vec<Sale>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sales = sqlx::query_as::<_, Sale>(select_sales!(
        r#"
        WHERE franchise_id = ?1 AND sales_date BETWEEN ?2 AND ?3
        ORDER BY sales_date, machine_id
        "#
    ))
    .bind(franchise_id)
    .bind(range.from)
    .bind(range.to)
    .fetch_all(executor)
    .await?;
    Ok(sales)
}

/// Payments against sales of a franchise dated inside `range`.
pub(crate) async fn fetch_franchise_payments<'e, E>(
    executor: E,
    franchise_id: &str,
    range: &DateRange,
) -> DbResult<Vec<Payment>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT p.id, p.sale_id, p.amount, p.method, p.reference, p.paid_on, p.created_at
        FROM payments p
        JOIN sales s ON s.id = p.sale_id
        WHERE s.franchise_id = ?1 AND s.sales_date BETWEEN ?2 AND ?3
        ORDER BY p.paid_on, p.created_at
        "#,
    )
    .bind(franchise_id)
    .bind(range.from)
    .bind(range.to)
    .fetch_all(executor)
    .await?;
    Ok(payments)
}

async fn fetch_total_paid<'e, E>(executor: E, sale_id: &str) -> DbResult<Money>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM payments WHERE sale_id = ?1")
        .bind(sale_id)
        .fetch_one(executor)
        .await?;
    Ok(Money::from_minor(total))
}

// =============================================================================
// Unit Tests
// =============================================================================
