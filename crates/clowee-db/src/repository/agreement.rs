//! # Agreement Repository
//!
//! Agreements are append-only: a change of terms is a new agreement with a
//! later effective date. At most one agreement per franchise per date.

use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use clowee_core::types::{Agreement, PricingTerms};
use clowee_core::validation::validate_pricing_terms;

/// Repository for agreement database operations.
#[derive(Debug, Clone)]
pub struct AgreementRepository {
    pool: SqlitePool,
}

impl AgreementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AgreementRepository { pool }
    }

    /// Creates an agreement taking effect on `effective_date`.
    pub async fn create(
        &self,
        franchise_id: &str,
        effective_date: NaiveDate,
        terms: PricingTerms,
        notes: Option<String>,
    ) -> DbResult<Agreement> {
        let agreement = Agreement {
            id: Uuid::new_v4().to_string(),
            franchise_id: franchise_id.to_string(),
            effective_date,
            terms,
            notes,
            created_at: Utc::now(),
        };

        self.insert(&agreement).await?;
        Ok(agreement)
    }

    pub async fn insert(&self, agreement: &Agreement) -> DbResult<()> {
        validate_pricing_terms(&agreement.terms)?;

        debug!(
            id = %agreement.id,
            franchise_id = %agreement.franchise_id,
            effective_date = %agreement.effective_date,
            "Inserting agreement"
        );

        let t = &agreement.terms;
        let result = sqlx::query(
            r#"
            INSERT INTO agreements (
                id, franchise_id, effective_date,
                coin_price, doll_price, vat_percentage,
                franchise_share, clowee_share, electricity_cost,
                maintenance_percentage, payment_duration,
                notes, created_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11,
                ?12, ?13
            )
            "#,
        )
        .bind(&agreement.id)
        .bind(&agreement.franchise_id)
        .bind(agreement.effective_date)
        .bind(t.coin_price)
        .bind(t.doll_price)
        .bind(t.vat_percentage)
        .bind(t.franchise_share)
        .bind(t.clowee_share)
        .bind(t.electricity_cost)
        .bind(t.maintenance_percentage)
        .bind(t.payment_duration)
        .bind(&agreement.notes)
        .bind(agreement.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match DbError::from(err) {
                e if e.is_unique_on("agreements.effective_date") => Err(DbError::duplicate(
                    "agreement effective date",
                    agreement.effective_date.to_string(),
                )),
                e => Err(e),
            },
        }
    }

    /// All agreements of a franchise, oldest first.
    pub async fn list_for_franchise(&self, franchise_id: &str) -> DbResult<Vec<Agreement>> {
        fetch_agreements(&self.pool, franchise_id).await
    }

    /// The agreement in force on `date`, if one has started.
    pub async fn effective_on(&self, franchise_id: &str, date: NaiveDate) -> DbResult<Option<Agreement>> {
        let agreement = sqlx::query_as::<_, Agreement>(
            r#"
            SELECT
                id, franchise_id, effective_date,
                coin_price, doll_price, vat_percentage,
                franchise_share, clowee_share, electricity_cost,
                maintenance_percentage, payment_duration,
                notes, created_at
            FROM agreements
            WHERE franchise_id = ?1 AND effective_date <= ?2
            ORDER BY effective_date DESC
            LIMIT 1
            "#,
        )
        .bind(franchise_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(agreement)
    }
}

pub(crate) async fn fetch_agreements<'e, E>(executor: E, franchise_id: &str) -> DbResult<Vec<Agreement>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let agreements = sqlx::query_as::<_, Agreement>(
        r#"
        SELECT
            id, franchise_id, effective_date,
            coin_price, doll_price, vat_percentage,
            franchise_share, clowee_share, electricity_cost,
            maintenance_percentage, payment_duration,
            notes, created_at
        FROM agreements
        WHERE franchise_id = ?1
        ORDER BY effective_date
        "#,
    )
    .bind(franchise_id)
    .fetch_all(executor)
    .await?;

    Ok(agreements)
}
