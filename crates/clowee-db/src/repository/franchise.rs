//! # Franchise Repository
//!
//! Franchises carry default pricing terms used when no agreement has taken
//! effect yet. Terms are stored inline as columns of the `franchises` row.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use clowee_core::types::{Franchise, PricingTerms};
use clowee_core::validation::{validate_franchise_name, validate_pricing_terms};

/// Repository for franchise database operations.
#[derive(Debug, Clone)]
pub struct FranchiseRepository {
    pool: SqlitePool,
}

impl FranchiseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FranchiseRepository { pool }
    }

    /// Creates an active franchise with a generated ID.
    pub async fn create(&self, name: &str, terms: PricingTerms) -> DbResult<Franchise> {
        let now = Utc::now();
        let franchise = Franchise {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            terms,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.insert(&franchise).await?;
        Ok(franchise)
    }

    /// Inserts a fully-formed franchise.
    pub async fn insert(&self, franchise: &Franchise) -> DbResult<()> {
        validate_franchise_name(&franchise.name)?;
        validate_pricing_terms(&franchise.terms)?;

        debug!(id = %franchise.id, name = %franchise.name, "Inserting franchise");

        let t = &franchise.terms;
        sqlx::query(
            r#"
            INSERT INTO franchises (
                id, name,
                coin_price, doll_price, vat_percentage,
                franchise_share, clowee_share, electricity_cost,
                maintenance_percentage, payment_duration,
                is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10,
                ?11, ?12, ?13
            )
            "#,
        )
        .bind(&franchise.id)
        .bind(&franchise.name)
        .bind(t.coin_price)
        .bind(t.doll_price)
        .bind(t.vat_percentage)
        .bind(t.franchise_share)
        .bind(t.clowee_share)
        .bind(t.electricity_cost)
        .bind(t.maintenance_percentage)
        .bind(t.payment_duration)
        .bind(franchise.is_active)
        .bind(franchise.created_at)
        .bind(franchise.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Franchise>> {
        fetch_franchise(&self.pool, id).await
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing row is an error.
    pub async fn get(&self, id: &str) -> DbResult<Franchise> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Franchise", id))
    }

    /// Active franchises ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Franchise>> {
        let franchises = sqlx::query_as::<_, Franchise>(
            r#"
            SELECT
                id, name,
                coin_price, doll_price, vat_percentage,
                franchise_share, clowee_share, electricity_cost,
                maintenance_percentage, payment_duration,
                is_active, created_at, updated_at
            FROM franchises
            WHERE is_active = 1
            ORDER BY name COLLATE NOCASE, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(franchises)
    }

    /// Replaces the default terms. Sales already recorded keep their figures.
    pub async fn update_terms(&self, id: &str, terms: &PricingTerms) -> DbResult<()> {
        validate_pricing_terms(terms)?;

        debug!(id = %id, "Updating franchise terms");

        let result = sqlx::query(
            r#"
            UPDATE franchises SET
                coin_price = ?2,
                doll_price = ?3,
                vat_percentage = ?4,
                franchise_share = ?5,
                clowee_share = ?6,
                electricity_cost = ?7,
                maintenance_percentage = ?8,
                payment_duration = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(terms.coin_price)
        .bind(terms.doll_price)
        .bind(terms.vat_percentage)
        .bind(terms.franchise_share)
        .bind(terms.clowee_share)
        .bind(terms.electricity_cost)
        .bind(terms.maintenance_percentage)
        .bind(terms.payment_duration)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Franchise", id));
        }

        Ok(())
    }

    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE franchises SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Franchise", id));
        }

        Ok(())
    }

    /// Number of franchises, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM franchises")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Loads a franchise on any executor, so sale recording can read it inside
/// its transaction.
pub(crate) async fn fetch_franchise<'e, E>(executor: E, id: &str) -> DbResult<Option<Franchise>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let franchise = sqlx::query_as::<_, Franchise>(
        r#"
        SELECT
            id, name,
            coin_price, doll_price, vat_percentage,
            franchise_share, clowee_share, electricity_cost,
            maintenance_percentage, payment_duration,
            is_active, created_at, updated_at
        FROM franchises
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(franchise)
}
