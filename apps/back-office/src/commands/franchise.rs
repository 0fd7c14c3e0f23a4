//! # Franchise Commands

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;

use crate::error::CliError;
use clowee_core::agreement::{effective_terms, TermsSource};
use clowee_core::types::PricingTerms;
use clowee_db::Database;

/// One line of `clowee franchises`.
#[derive(Debug, Clone, Serialize)]
pub struct FranchiseSummary {
    pub id: String,
    pub name: String,
    pub machines: usize,
    /// Terms in force on the listing date.
    pub terms: PricingTerms,
    pub source: TermsSource,
}

/// Active franchises with the terms in force on `today`.
pub async fn list(db: &Database, today: NaiveDate) -> Result<Vec<FranchiseSummary>, CliError> {
    debug!(%today, "franchises command");

    let franchises = db.franchises().list_active().await?;
    let mut rows = Vec::with_capacity(franchises.len());

    for franchise in &franchises {
        let agreements = db.agreements().list_for_franchise(&franchise.id).await?;
        let machines = db.machines().list_for_franchise(&franchise.id).await?;
        let effective = effective_terms(franchise, &agreements, today);

        rows.push(FranchiseSummary {
            id: franchise.id.clone(),
            name: franchise.name.clone(),
            machines: machines.iter().filter(|m| m.is_active).count(),
            terms: effective.terms.clone(),
            source: effective.source,
        });
    }

    Ok(rows)
}

pub fn render(rows: &[FranchiseSummary]) -> String {
    if rows.is_empty() {
        return "No active franchises.\n".to_string();
    }

    let mut out = String::new();
    for row in rows {
        let source = match &row.source {
            TermsSource::Agreement(id) => format!("agreement {id}"),
            TermsSource::FranchiseDefault => "franchise defaults".to_string(),
        };
        let _ = writeln!(out, "{}  {}", row.id, row.name);
        let _ = writeln!(
            out,
            "    machines {} | coin {} | doll {} | VAT {} | split {} / {} | {} | {}",
            row.machines,
            row.terms.coin_price,
            row.terms.doll_price,
            row.terms.vat_percentage,
            row.terms.franchise_share,
            row.terms.clowee_share,
            row.terms.payment_duration,
            source,
        );
    }
    out
}
