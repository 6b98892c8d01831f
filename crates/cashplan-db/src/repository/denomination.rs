//! # Denomination Repository
//!
//! Note stock per face value.
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE denominations                                                   │
//! │     SET available_count = available_count - :count                      │
//! │   WHERE value = :value AND available_count >= :count                    │
//! │                                                                         │
//! │  rows_affected = 1  → decremented                                       │
//! │  rows_affected = 0  → stock moved under us: InventoryConflict, and the  │
//! │                       caller's transaction rolls back every line        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use cashplan_core::validation::{validate_inventory_count, validate_restock_quantity};
use cashplan_core::{Consumption, Denomination, Inventory};

/// Repository for denomination and stock operations.
#[derive(Debug, Clone)]
pub struct DenominationRepository {
    pool: SqlitePool,
}

impl DenominationRepository {
    /// Creates a new DenominationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DenominationRepository { pool }
    }

    /// All denominations, largest value first.
    pub async fn list(&self) -> DbResult<Vec<Denomination>> {
        let denominations = sqlx::query_as::<_, Denomination>(
            r#"
            SELECT value, image_name, is_available, available_count
            FROM denominations
            ORDER BY value DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(denominations)
    }

    /// Values flagged available, largest first.
    pub async fn available_values(&self) -> DbResult<Vec<i64>> {
        let values = sqlx::query_scalar::<_, i64>(
            "SELECT value FROM denominations WHERE is_available = 1 ORDER BY value DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    pub async fn get(&self, value: i64) -> DbResult<Option<Denomination>> {
        let denomination = sqlx::query_as::<_, Denomination>(
            r#"
            SELECT value, image_name, is_available, available_count
            FROM denominations
            WHERE value = ?1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(denomination)
    }

    /// Adds a new denomination.
    ///
    /// ## Errors
    /// `UniqueViolation` when the value already exists.
    pub async fn insert(&self, denomination: &Denomination) -> DbResult<()> {
        if denomination.value <= 0 {
            return Err(cashplan_core::CoreError::InvalidDenomination {
                value: denomination.value,
            }
            .into());
        }
        validate_inventory_count(denomination.available_count)?;

        debug!(value = denomination.value, "Inserting denomination");

        sqlx::query(
            r#"
            INSERT INTO denominations (value, image_name, is_available, available_count)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(denomination.value)
        .bind(&denomination.image_name)
        .bind(denomination.is_available)
        .bind(denomination.available_count)
        .execute(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: denomination.value.to_string(),
            },
            other => other,
        })?;

        info!(value = denomination.value, "Denomination added");
        Ok(())
    }

    /// Stock snapshot restricted to `values`.
    pub async fn snapshot(&self, values: &[i64]) -> DbResult<Inventory> {
        let mut conn = self.pool.acquire().await?;
        snapshot(&mut conn, values).await
    }

    /// Overwrites the count of one denomination.
    ///
    /// ## Errors
    /// - Validation error for a negative count
    /// - `NotFound` for an unknown value
    pub async fn set_count(&self, value: i64, count: i64) -> DbResult<()> {
        validate_inventory_count(count)?;

        debug!(value, count, "Setting denomination count");

        let result = sqlx::query("UPDATE denominations SET available_count = ?1 WHERE value = ?2")
            .bind(count)
            .bind(value)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Denomination", value));
        }

        info!(value, count, "Denomination count updated");
        Ok(())
    }

    /// Toggles whether a denomination is offered for selection.
    pub async fn set_available(&self, value: i64, is_available: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE denominations SET is_available = ?1 WHERE value = ?2")
            .bind(is_available)
            .bind(value)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Denomination", value));
        }

        Ok(())
    }

    /// Sets every denomination to `count`. Returns the rows touched.
    pub async fn reset_counts(&self, count: i64) -> DbResult<u64> {
        validate_inventory_count(count)?;

        let result = sqlx::query("UPDATE denominations SET available_count = ?1")
            .bind(count)
            .execute(&self.pool)
            .await?;

        info!(count, rows = result.rows_affected(), "Inventory reset");
        Ok(result.rows_affected())
    }

    /// Adds notes to a denomination.
    pub async fn restock(&self, value: i64, quantity: i64) -> DbResult<()> {
        validate_restock_quantity(quantity)?;

        let result = sqlx::query(
            "UPDATE denominations SET available_count = available_count + ?1 WHERE value = ?2",
        )
        .bind(quantity)
        .bind(value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Denomination", value));
        }

        info!(value, quantity, "Denomination restocked");
        Ok(())
    }

    /// Applies a consumption in its own transaction, all or nothing.
    ///
    /// Prefer the calculation service, which also holds the dispense lock.
    pub async fn consume(&self, consumption: &Consumption) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        consume(&mut tx, consumption).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Transaction-scoped statements
// =============================================================================

/// Reads the stock of `values` on `conn`. Unknown values are left out and
/// therefore count as zero.
pub async fn snapshot(conn: &mut SqliteConnection, values: &[i64]) -> DbResult<Inventory> {
    let rows = sqlx::query_as::<_, (i64, i64)>("SELECT value, available_count FROM denominations")
        .fetch_all(&mut *conn)
        .await?;

    let inventory: Inventory = rows
        .into_iter()
        .filter(|(value, _)| values.contains(value))
        .collect();

    debug!(denominations = inventory.len(), "Inventory snapshot read");
    Ok(inventory)
}

/// Decrements every consumed value with a stock guard.
///
/// Stops at the first guard miss; the caller must drop (roll back) its
/// transaction on error.
pub async fn consume(conn: &mut SqliteConnection, consumption: &Consumption) -> DbResult<()> {
    for (value, count) in consumption.iter() {
        let result = sqlx::query(
            r#"
            UPDATE denominations
            SET available_count = available_count - ?1
            WHERE value = ?2 AND available_count >= ?1
            "#,
        )
        .bind(count)
        .bind(value)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT available_count FROM denominations WHERE value = ?1")
                    .bind(value)
                    .fetch_optional(&mut *conn)
                    .await?;

            warn!(
                value,
                requested = count,
                available = ?available,
                "Guarded decrement refused"
            );
            return Err(DbError::InventoryConflict {
                value,
                available: available.unwrap_or(0),
                requested: count,
            });
        }
    }

    debug!(notes = consumption.total_notes(), "Inventory decremented");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cashplan_core::BreakdownLine;

    async fn repo() -> DenominationRepository {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .denominations()
    }

    #[tokio::test]
    async fn test_seeded_denominations() {
        let repo = repo().await;
        let list = repo.list().await.unwrap();

        let values: Vec<i64> = list.iter().map(|d| d.value).collect();
        assert_eq!(values, cashplan_core::DEFAULT_DENOMINATIONS.to_vec());
        assert!(list.iter().all(|d| d.available_count == 100 && d.is_available));
        assert_eq!(list[0].image_name, "50000.jpg");
    }

    #[tokio::test]
    async fn test_set_count_rules() {
        let repo = repo().await;

        repo.set_count(500, 3).await.unwrap();
        assert_eq!(repo.get(500).await.unwrap().unwrap().available_count, 3);

        assert!(matches!(
            repo.set_count(500, -1).await,
            Err(DbError::Domain(_))
        ));
        assert!(matches!(
            repo.set_count(750, 10).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reset_and_restock() {
        let repo = repo().await;
        repo.set_count(1_000, 7).await.unwrap();
        repo.restock(1_000, 5).await.unwrap();
        assert_eq!(repo.get(1_000).await.unwrap().unwrap().available_count, 12);

        let rows = repo.reset_counts(100).await.unwrap();
        assert_eq!(rows, 7);
        assert_eq!(repo.get(1_000).await.unwrap().unwrap().available_count, 100);
    }

    #[tokio::test]
    async fn test_availability_filter() {
        let repo = repo().await;
        repo.set_available(250, false).await.unwrap();

        let values = repo.available_values().await.unwrap();
        assert!(!values.contains(&250));
        assert_eq!(values.len(), 6);
    }

    #[tokio::test]
    async fn test_insert_duplicate_value() {
        let repo = repo().await;
        repo.insert(&Denomination::new(100, 10)).await.unwrap();
        assert!(matches!(
            repo.insert(&Denomination::new(100, 10)).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_consume_is_all_or_nothing() {
        let repo = repo().await;
        repo.set_count(500, 1).await.unwrap();

        let consumption = Consumption::from_lines(&[
            BreakdownLine::new(1_000, 2),
            BreakdownLine::new(500, 2),
        ]);
        let err = repo.consume(&consumption).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::InventoryConflict {
                value: 500,
                available: 1,
                requested: 2
            }
        ));

        // the 1000 line ran first and was rolled back with the rest
        assert_eq!(repo.get(1_000).await.unwrap().unwrap().available_count, 100);
        assert_eq!(repo.get(500).await.unwrap().unwrap().available_count, 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_restricted_to_values() {
        let repo = repo().await;
        let inventory = repo.snapshot(&[1_000, 500, 333]).await.unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.available(333), 0);
        assert_eq!(inventory.available(1_000), 100);
    }
}
