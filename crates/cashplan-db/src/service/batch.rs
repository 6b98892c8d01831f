//! # Batch Runner
//!
//! Runs a payroll batch against the stored inventory and optionally
//! persists it: one transaction for the whole batch, under the dispense lock.
//!
//! | mode        | stock read | persisted decrement                     |
//! |-------------|------------|-----------------------------------------|
//! | `unlimited` | no         | none                                    |
//! | `snapshot`  | yes        | refused while the report is overdrawn   |
//! | `running`   | yes        | total consumption, always fits          |

use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{calculation, denomination};
use cashplan_core::batch::{run_batch, BatchOutcome, BatchReport, Employee, InventoryMode};
use cashplan_core::validation::{validate_label, validate_name};
use cashplan_core::{
    CalculationRecord, DenominationSet, Inventory, NewCalculation, Strategy,
    DEFAULT_CURRENCY_CODE,
};

/// Input for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub employees: Vec<Employee>,
    pub denominations: Vec<i64>,
    pub mode: InventoryMode,
    pub strategy: Strategy,
    /// Decrement stock by the batch consumption.
    pub persist: bool,
    /// Save each successful entry to history.
    pub save_to_history: bool,
    pub currency: String,
}

impl BatchRequest {
    pub fn new(employees: Vec<Employee>, denominations: &[i64]) -> Self {
        BatchRequest {
            employees,
            denominations: denominations.to_vec(),
            mode: InventoryMode::default(),
            strategy: Strategy::default(),
            persist: false,
            save_to_history: false,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
        }
    }

    pub fn mode(mut self, mode: InventoryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn save_to_history(mut self, save: bool) -> Self {
        self.save_to_history = save;
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    fn writes(&self) -> bool {
        self.persist || self.save_to_history
    }
}

/// A finished batch and the history rows it wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRun {
    pub report: BatchReport,
    pub saved: Vec<CalculationRecord>,
    /// Whether the consumption was removed from stock.
    pub persisted: bool,
}

#[derive(Debug, Clone)]
pub struct BatchRunner {
    pool: SqlitePool,
    dispense_lock: Arc<Mutex<()>>,
}

impl BatchRunner {
    pub fn new(pool: SqlitePool, dispense_lock: Arc<Mutex<()>>) -> Self {
        BatchRunner {
            pool,
            dispense_lock,
        }
    }

    /// Runs the batch and, when asked, writes it.
    ///
    /// ## Errors
    /// - Validation errors (empty list, bad denominations, unnamed entries
    ///   when saving to history)
    /// - `InventoryOverdrawn` when persisting a snapshot batch whose total
    ///   consumption exceeds stock; nothing is written
    /// - `InventoryConflict` if a guarded decrement misses
    pub async fn run(&self, request: &BatchRequest) -> DbResult<BatchRun> {
        let denominations = DenominationSet::new(&request.denominations)?;
        if request.save_to_history {
            for employee in &request.employees {
                validate_name(&employee.name)?;
                validate_label("rank", &employee.history_rank())?;
            }
        }

        let _guard = if request.writes() {
            Some(self.dispense_lock.lock().await)
        } else {
            None
        };
        let mut tx = self.pool.begin().await?;

        let inventory = match request.mode {
            InventoryMode::Unlimited => Inventory::new(),
            _ => denomination::snapshot(&mut tx, denominations.values()).await?,
        };

        let mut report = run_batch(
            &request.employees,
            &denominations,
            &inventory,
            request.mode,
            request.strategy,
        )?;
        apply_currency(&mut report, &request.currency);

        debug!(
            mode = %report.mode,
            successful = report.summary.successful,
            failed = report.summary.failed,
            "Batch calculated"
        );

        if !request.writes() {
            return Ok(BatchRun {
                report,
                saved: Vec::new(),
                persisted: false,
            });
        }

        if request.persist && !report.can_persist() {
            warn!(
                shortfalls = report.overdrawn.len(),
                "Snapshot batch overdraws inventory, nothing persisted"
            );
            return Err(DbError::InventoryOverdrawn {
                shortfalls: report.overdrawn.clone(),
            });
        }

        let persisted = request.persist && !report.consumption.is_empty();
        if persisted {
            denomination::consume(&mut tx, &report.consumption).await?;
        }

        let mut saved = Vec::new();
        if request.save_to_history {
            for (employee, breakdown) in report.successes() {
                let entry = NewCalculation::from_breakdown(
                    &employee.name,
                    employee.history_rank(),
                    employee.salary,
                    breakdown,
                );
                saved.push(calculation::insert(&mut tx, &entry).await?);
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            mode = %report.mode,
            employees = report.summary.total_employees,
            notes = report.consumption.total_notes(),
            persisted,
            saved = saved.len(),
            "Batch committed"
        );

        Ok(BatchRun {
            report,
            saved,
            persisted,
        })
    }
}

fn apply_currency(report: &mut BatchReport, currency: &str) {
    for item in &mut report.items {
        if let BatchOutcome::Calculated { result } = &mut item.outcome {
            *result = result.clone().with_currency(currency);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn two_at_500() -> Vec<Employee> {
        vec![
            Employee::new("Ali", "Grade 1", "", 500),
            Employee::new("Sara", "Grade 2", "Finance", 500),
        ]
    }

    async fn count(db: &Database, value: i64) -> i64 {
        db.denominations()
            .get(value)
            .await
            .unwrap()
            .unwrap()
            .available_count
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let db = db().await;
        let request = BatchRequest::new(two_at_500(), &[500]);

        let run = db.batch_runner().run(&request).await.unwrap();
        assert_eq!(run.report.summary.successful, 2);
        assert!(!run.persisted);
        assert_eq!(count(&db, 500).await, 100);
        assert_eq!(db.calculations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_running_batch_persists_and_saves() {
        let db = db().await;
        db.denominations().set_count(500, 1).await.unwrap();

        let request = BatchRequest::new(two_at_500(), &[500])
            .persist(true)
            .save_to_history(true);
        let run = db.batch_runner().run(&request).await.unwrap();

        assert_eq!(run.report.summary.successful, 1);
        assert_eq!(run.report.summary.failed, 1);
        assert!(run.persisted);
        assert_eq!(count(&db, 500).await, 0);

        assert_eq!(run.saved.len(), 1);
        assert_eq!(run.saved[0].name, "Ali");
    }

    #[tokio::test]
    async fn test_history_rank_includes_department() {
        let db = db().await;
        let request = BatchRequest::new(two_at_500(), &[500]).save_to_history(true);
        let run = db.batch_runner().run(&request).await.unwrap();

        let ranks: Vec<&str> = run.saved.iter().map(|r| r.rank.as_str()).collect();
        assert_eq!(ranks, vec!["Grade 1", "Grade 2 - Finance"]);
        // history only, stock untouched
        assert_eq!(count(&db, 500).await, 100);
    }

    #[tokio::test]
    async fn test_overdrawn_snapshot_is_refused() {
        let db = db().await;
        db.denominations().set_count(500, 1).await.unwrap();

        let request = BatchRequest::new(two_at_500(), &[500])
            .mode(InventoryMode::Snapshot)
            .persist(true)
            .save_to_history(true);
        let err = db.batch_runner().run(&request).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::InventoryOverdrawn { ref shortfalls } if shortfalls.len() == 1
        ));
        assert_eq!(count(&db, 500).await, 1);
        assert_eq!(db.calculations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unlimited_persist_leaves_stock() {
        let db = db().await;
        db.denominations().set_count(500, 0).await.unwrap();

        let request = BatchRequest::new(two_at_500(), &[500])
            .mode(InventoryMode::Unlimited)
            .persist(true);
        let run = db.batch_runner().run(&request).await.unwrap();

        assert_eq!(run.report.summary.successful, 2);
        assert!(!run.persisted);
        assert_eq!(count(&db, 500).await, 0);
    }

    #[tokio::test]
    async fn test_unnamed_entry_blocks_history_save() {
        let db = db().await;
        let employees = vec![Employee::new("", "", "", 500)];
        let request = BatchRequest::new(employees, &[500]).save_to_history(true);

        assert!(db.batch_runner().run(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_is_an_error() {
        let db = db().await;
        let request = BatchRequest::new(Vec::new(), &[500]);
        assert!(matches!(
            db.batch_runner().run(&request).await,
            Err(DbError::Domain(_))
        ));
    }
}
