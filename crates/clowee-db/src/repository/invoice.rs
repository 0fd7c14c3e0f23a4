//! # Invoice Repository
//!
//! Loads a franchise's sales and payments for a date range and hands them to
//! [`clowee_core::invoice`]. Nothing is stored; invoices are rebuilt on every
//! request from the figures recorded on each sale.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::agreement::fetch_agreements;
use crate::repository::franchise::fetch_franchise;
use crate::repository::sale::{fetch_franchise_payments, fetch_franchise_sales};
use clowee_core::invoice::{aggregate, FranchiseInvoice, FranchiseReport};
use clowee_core::period::DateRange;

/// Repository for invoice and report queries.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Builds the invoice of `franchise_id` for sales dated inside `range`.
    pub async fn build(&self, franchise_id: &str, range: DateRange) -> DbResult<FranchiseInvoice> {
        // One read transaction so sales and payments come from the same snapshot.
        let mut tx = self.pool.begin().await?;

        let franchise = fetch_franchise(&mut *tx, franchise_id)
            .await?
            .ok_or_else(|| DbError::not_found("Franchise", franchise_id))?;
        let sales = fetch_franchise_sales(&mut *tx, franchise_id, &range).await?;
        let payments = fetch_franchise_payments(&mut *tx, franchise_id, &range).await?;

        tx.commit().await?;

        debug!(
            franchise_id = %franchise_id,
            sales = sales.len(),
            payments = payments.len(),
            "Building invoice"
        );

        Ok(FranchiseInvoice::build(&franchise, range, &sales, &payments))
    }

    /// Totals and per-machine breakdown recomputed against the agreement
    /// history, without payment information. May differ from the invoice
    /// when an agreement was back-dated over recorded sales.
    pub async fn report(&self, franchise_id: &str, range: DateRange) -> DbResult<FranchiseReport> {
        let franchise = fetch_franchise(&self.pool, franchise_id)
            .await?
            .ok_or_else(|| DbError::not_found("Franchise", franchise_id))?;
        let agreements = fetch_agreements(&self.pool, franchise_id).await?;
        let sales = fetch_franchise_sales(&self.pool, franchise_id, &range).await?;

        Ok(aggregate(&franchise, &sales, &agreements))
    }
}
