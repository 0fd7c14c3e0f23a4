//! # Machine Repository
//!
//! Machines and their cumulative counter readings.
//!
//! ```text
//! reading 2026-09-30: coin 10_000  prize 800 ─┐
//!                                              ├─► SaleDraft { coin 950, prize 70 }
//! reading 2026-10-31: coin 10_950  prize 870 ─┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use clowee_core::types::{CounterReading, Machine};
use clowee_core::validation::{validate_machine_name, validate_serial_number};
use clowee_core::{CoreError, ValidationError};

/// Repository for machine database operations.
#[derive(Debug, Clone)]
pub struct MachineRepository {
    pool: SqlitePool,
}

impl MachineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MachineRepository { pool }
    }

    /// Registers an active machine at a franchise.
    pub async fn create(
        &self,
        franchise_id: &str,
        name: &str,
        serial_number: &str,
        location: Option<&str>,
    ) -> DbResult<Machine> {
        let now = Utc::now();
        let machine = Machine {
            id: Uuid::new_v4().to_string(),
            franchise_id: franchise_id.to_string(),
            name: name.trim().to_string(),
            serial_number: serial_number.trim().to_string(),
            location: location.map(str::to_string),
            installed_on: Some(now.date_naive()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.insert(&machine).await?;
        Ok(machine)
    }

    pub async fn insert(&self, machine: &Machine) -> DbResult<()> {
        validate_machine_name(&machine.name)?;
        validate_serial_number(&machine.serial_number)?;

        debug!(id = %machine.id, serial = %machine.serial_number, "Inserting machine");

        let result = sqlx::query(
            r#"
            INSERT INTO machines (
                id, franchise_id, name, serial_number, location,
                installed_on, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&machine.id)
        .bind(&machine.franchise_id)
        .bind(&machine.name)
        .bind(&machine.serial_number)
        .bind(&machine.location)
        .bind(machine.installed_on)
        .bind(machine.is_active)
        .bind(machine.created_at)
        .bind(machine.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match DbError::from(err) {
                e if e.is_unique_on("machines.serial_number") => {
                    Err(DbError::duplicate("serial number", machine.serial_number.clone()))
                }
                e => Err(e),
            },
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Machine>> {
        fetch_machine(&self.pool, id).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Machine> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Machine", id))
    }

    /// Machines of a franchise ordered by name, inactive ones included.
    pub async fn list_for_franchise(&self, franchise_id: &str) -> DbResult<Vec<Machine>> {
        let machines = sqlx::query_as::<_, Machine>(
            r#"
            SELECT
                id, franchise_id, name, serial_number, location,
                installed_on, is_active, created_at, updated_at
            FROM machines
            WHERE franchise_id = ?1
            ORDER BY name COLLATE NOCASE, id
            "#,
        )
        .bind(franchise_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(machines)
    }

    /// Decommissions (or re-activates) a machine. History is kept.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE machines SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Machine", id));
        }

        Ok(())
    }

    /// Stores a cumulative counter reading.
    ///
    /// Counters only move forward: a reading lower than the nearest earlier
    /// one, or higher than the nearest later one, is rejected as
    /// [`CoreError::CounterRegression`].
    pub async fn record_reading(
        &self,
        machine_id: &str,
        reading_date: NaiveDate,
        coin_counter: i64,
        prize_counter: i64,
    ) -> DbResult<CounterReading> {
        for (field, value) in [("coin_counter", coin_counter), ("prize_counter", prize_counter)] {
            if value < 0 {
                return Err(ValidationError::MustNotBeNegative {
                    field: field.to_string(),
                }
                .into());
            }
        }

        let mut tx = self.pool.begin().await?;

        if let Some(before) = fetch_reading_on_or_before(&mut *tx, machine_id, reading_date).await? {
            ensure_forward(&before, coin_counter, prize_counter, |earlier, new| (earlier, new))?;
        }
        if let Some(after) = fetch_reading_after(&mut *tx, machine_id, reading_date).await? {
            ensure_forward(&after, coin_counter, prize_counter, |later, new| (new, later))?;
        }

        let reading = CounterReading {
            id: Uuid::new_v4().to_string(),
            machine_id: machine_id.to_string(),
            reading_date,
            coin_counter,
            prize_counter,
            created_at: Utc::now(),
        };

        debug!(machine_id = %machine_id, date = %reading_date, "Recording counter reading");

        sqlx::query(
            r#"
            INSERT INTO machine_counters (
                id, machine_id, reading_date, coin_counter, prize_counter, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&reading.id)
        .bind(&reading.machine_id)
        .bind(reading.reading_date)
        .bind(reading.coin_counter)
        .bind(reading.prize_counter)
        .bind(reading.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reading)
    }

    /// Most recent reading taken on or before `date`.
    pub async fn latest_reading_on_or_before(
        &self,
        machine_id: &str,
        date: NaiveDate,
    ) -> DbResult<Option<CounterReading>> {
        fetch_reading_on_or_before(&self.pool, machine_id, date).await
    }
}

/// Rejects `coin`/`prize` when they would run backwards against `neighbour`.
/// `order` maps `(neighbour, new)` to `(earlier, later)`.
fn ensure_forward(
    neighbour: &CounterReading,
    coin: i64,
    prize: i64,
    order: impl Fn(i64, i64) -> (i64, i64),
) -> DbResult<()> {
    let checks = [
        ("coin", order(neighbour.coin_counter, coin)),
        ("prize", order(neighbour.prize_counter, prize)),
    ];
    for (counter, (earlier, later)) in checks {
        if later < earlier {
            return Err(CoreError::CounterRegression {
                counter: counter.to_string(),
                previous: earlier,
                current: later,
            }
            .into());
        }
    }
    Ok(())
}

async fn fetch_reading_on_or_before<'e, E>(
    executor: E,
    machine_id: &str,
    date: NaiveDate,
) -> DbResult<Option<CounterReading>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let reading = sqlx::query_as::<_, CounterReading>(
        r#"
        SELECT id, machine_id, reading_date, coin_counter, prize_counter, created_at
        FROM machine_counters
        WHERE machine_id = ?1 AND reading_date <= ?2
        ORDER BY reading_date DESC
        LIMIT 1
        "#,
    )
    .bind(machine_id)
    .bind(date)
    .fetch_optional(executor)
    .await?;

    Ok(reading)
}

async fn fetch_reading_after<'e, E>(executor: E, machine_id: &str, date: NaiveDate) -> DbResult<Option<CounterReading>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let reading = sqlx::query_as::<_, CounterReading>(
        r#"
        SELECT id, machine_id, reading_date, coin_counter, prize_counter, created_at
        FROM machine_counters
        WHERE machine_id = ?1 AND reading_date > ?2
        ORDER BY reading_date ASC
        LIMIT 1
        "#,
    )
    .bind(machine_id)
    .bind(date)
    .fetch_optional(executor)
    .await?;

    Ok(reading)
}

pub(crate) async fn fetch_machine<'e, E>(executor: E, id: &str) -> DbResult<Option<Machine>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let machine = sqlx::query_as::<_, Machine>(
        r#"
        SELECT
            id, franchise_id, name, serial_number, location,
            installed_on, is_active, created_at, updated_at
        FROM machines
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{date, db_with_machine};
    use clowee_core::sale::SaleDraft;

    #[tokio::test]
    async fn test_create_get_and_list() {
        let (db, franchise, machine) = db_with_machine().await;
        let repo = db.machines();
        repo.create(&franchise.id, "Aardvark claw", "BC-0002", None).await.unwrap();

        let loaded = repo.get(&machine.id).await.unwrap();
        assert_eq!(loaded.serial_number, "BC-0001");
        assert_eq!(loaded.location.as_deref(), Some("Level 4"));

        let names: Vec<String> = repo
            .list_for_franchise(&franchise.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Aardvark claw".to_string(), "Claw A".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_serial_rejected() {
        let (db, franchise, _) = db_with_machine().await;
        let err = db
            .machines()
            .create(&franchise.id, "Claw B", "BC-0001", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "BC-0001"));
    }

    #[tokio::test]
    async fn test_set_active() {
        let (db, _, machine) = db_with_machine().await;
        db.machines().set_active(&machine.id, false).await.unwrap();
        assert!(!db.machines().get(&machine.id).await.unwrap().is_active);
        assert!(db.machines().set_active("missing", false).await.is_err());
    }

    #[tokio::test]
    async fn test_readings_feed_sale_draft() {
        let (db, _, machine) = db_with_machine().await;
        let repo = db.machines();
        repo.record_reading(&machine.id, date(2026, 9, 30), 10_000, 800).await.unwrap();
        repo.record_reading(&machine.id, date(2026, 10, 31), 10_950, 870).await.unwrap();

        let previous = repo
            .latest_reading_on_or_before(&machine.id, date(2026, 10, 30))
            .await
            .unwrap()
            .unwrap();
        let current = repo
            .latest_reading_on_or_before(&machine.id, date(2026, 10, 31))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(previous.reading_date, date(2026, 9, 30));

        let draft = SaleDraft::from_readings(&previous, &current).unwrap();
        assert_eq!(draft.coin_sales, 950);
        assert_eq!(draft.prize_out_quantity, 70);

        assert!(repo
            .latest_reading_on_or_before(&machine.id, date(2026, 9, 29))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reading_regression_rejected() {
        let (db, _, machine) = db_with_machine().await;
        let repo = db.machines();
        repo.record_reading(&machine.id, date(2026, 9, 30), 10_000, 800).await.unwrap();

        let err = repo
            .record_reading(&machine.id, date(2026, 10, 31), 9_000, 900)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CounterRegression { .. })));

        let err = repo.record_reading(&machine.id, date(2026, 10, 31), -1, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_backdated_reading_must_fit_between_neighbours() {
        let (db, _, machine) = db_with_machine().await;
        let repo = db.machines();
        repo.record_reading(&machine.id, date(2026, 9, 30), 500, 50).await.unwrap();
        repo.record_reading(&machine.id, date(2026, 10, 31), 1_000, 100).await.unwrap();

        let err = repo
            .record_reading(&machine.id, date(2026, 10, 15), 5_000, 500)
            .await
            .unwrap_err();
        match err {
            DbError::Domain(CoreError::CounterRegression { counter, previous, current }) => {
                assert_eq!(counter, "coin");
                assert_eq!((previous, current), (5_000, 1_000));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = repo
            .record_reading(&machine.id, date(2026, 10, 15), 700, 101)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CounterRegression { ref counter, .. }) if counter == "prize"
        ));

        repo.record_reading(&machine.id, date(2026, 10, 15), 700, 70).await.unwrap();
        let mid = repo
            .latest_reading_on_or_before(&machine.id, date(2026, 10, 20))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mid.coin_counter, 700);
    }
}
