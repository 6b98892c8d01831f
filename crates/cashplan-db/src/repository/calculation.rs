//! # Calculation Repository
//!
//! History of successful calculations. The breakdown lines live in a JSON
//! text column and are decoded on read.

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::timestamp;
use crate::error::{DbError, DbResult};
use cashplan_core::validation::{validate_search_query, validate_uuid};
use cashplan_core::{BreakdownLine, CalculationRecord, NewCalculation};

/// Row shape of the `calculations` table.
#[derive(Debug, FromRow)]
struct CalculationRow {
    id: String,
    name: String,
    rank: String,
    salary: i64,
    breakdown: String,
    total_notes: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<CalculationRow> for CalculationRecord {
    type Error = DbError;

    fn try_from(row: CalculationRow) -> Result<Self, Self::Error> {
        let breakdown: Vec<BreakdownLine> = serde_json::from_str(&row.breakdown)?;
        Ok(CalculationRecord {
            id: row.id,
            name: row.name,
            rank: row.rank,
            salary: row.salary,
            breakdown,
            total_notes: row.total_notes,
            created_at: row.created_at,
        })
    }
}

fn into_records(rows: Vec<CalculationRow>) -> DbResult<Vec<CalculationRecord>> {
    rows.into_iter().map(CalculationRecord::try_from).collect()
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, rank, salary, breakdown, total_notes, created_at FROM calculations";

/// Repository for calculation history.
#[derive(Debug, Clone)]
pub struct CalculationRepository {
    pool: SqlitePool,
}

impl CalculationRepository {
    /// Creates a new CalculationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CalculationRepository { pool }
    }

    /// Newest first. `None` returns the whole history.
    pub async fn list(&self, limit: Option<u32>) -> DbResult<Vec<CalculationRecord>> {
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query_as::<_, CalculationRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<CalculationRecord>> {
        validate_uuid(id)?;

        let row = sqlx::query_as::<_, CalculationRow>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CalculationRecord::try_from).transpose()
    }

    /// Saves a calculation and returns the stored record.
    pub async fn insert(&self, entry: &NewCalculation) -> DbResult<CalculationRecord> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, entry).await
    }

    /// Replaces the editable fields of a record.
    ///
    /// ## Errors
    /// `NotFound` when no record has this id.
    pub async fn update(&self, id: &str, entry: &NewCalculation) -> DbResult<CalculationRecord> {
        validate_uuid(id)?;
        entry.validate()?;

        let breakdown = serde_json::to_string(&entry.breakdown)?;

        let result = sqlx::query(
            r#"
            UPDATE calculations
            SET name = ?1, rank = ?2, salary = ?3, breakdown = ?4, total_notes = ?5
            WHERE id = ?6
            "#,
        )
        .bind(entry.name.trim())
        .bind(entry.rank.trim())
        .bind(entry.salary)
        .bind(&breakdown)
        .bind(entry.total_notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Calculation", id));
        }

        info!(id = %id, "Calculation updated");
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Calculation", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        validate_uuid(id)?;

        let result = sqlx::query("DELETE FROM calculations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Calculation", id));
        }

        info!(id = %id, "Calculation deleted");
        Ok(())
    }

    /// Substring match on name or rank, newest first. An empty query lists
    /// everything.
    pub async fn search(&self, query: &str) -> DbResult<Vec<CalculationRecord>> {
        let query = validate_search_query(query)?;
        if query.is_empty() {
            return self.list(None).await;
        }

        debug!(query = %query, "Searching history");

        let pattern = format!("%{}%", query);
        let rows = sqlx::query_as::<_, CalculationRow>(&format!(
            "{SELECT_COLUMNS} WHERE name LIKE ?1 OR rank LIKE ?1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM calculations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Inserts a history record on `conn` (usually inside a dispense
/// transaction).
pub async fn insert(
    conn: &mut SqliteConnection,
    entry: &NewCalculation,
) -> DbResult<CalculationRecord> {
    entry.validate()?;

    let record = CalculationRecord {
        id: Uuid::new_v4().to_string(),
        name: entry.name.trim().to_string(),
        rank: entry.rank.trim().to_string(),
        salary: entry.salary,
        breakdown: entry.breakdown.clone(),
        total_notes: entry.total_notes,
        created_at: Utc::now().trunc_subsecs(6),
    };
    let breakdown = serde_json::to_string(&record.breakdown)?;

    sqlx::query(
        r#"
        INSERT INTO calculations (id, name, rank, salary, breakdown, total_notes, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.rank)
    .bind(record.salary)
    .bind(&breakdown)
    .bind(record.total_notes)
    .bind(timestamp(record.created_at))
    .execute(&mut *conn)
    .await?;

    debug!(id = %record.id, salary = record.salary, "Calculation saved");
    Ok(record)
}

// =============================================================================
// Unit Tests
// =============================================================================
