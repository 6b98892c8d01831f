//! # Calculation Service
//!
//! Single-salary calculations against the live inventory.
//!
//! [`CalculationService::calculate`] is a preview: it may read a stock
//! snapshot but never decrements it. [`CalculationService::calculate_and_dispense`]
//! reads, decides and decrements inside one transaction while holding the
//! shared dispense lock, so two concurrent dispenses can never both spend the
//! same notes.

use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{calculation, denomination};
use cashplan_core::breakdown::plan;
use cashplan_core::validation::{validate_amount, validate_label, validate_name};
use cashplan_core::{
    Breakdown, BreakdownResult, CalculationRecord, Consumption, DenominationSet, NewCalculation,
    Strategy, DEFAULT_CURRENCY_CODE,
};

// =============================================================================
// Request / Outcome
// =============================================================================

/// Input for one calculation.
///
/// ## Example
/// ```rust,ignore
/// let request = CalculationRequest::new(1_250_000, &[50_000, 25_000, 10_000])
///     .employee("Ali", "Grade 1")
///     .save_to_history(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRequest {
    pub name: String,
    pub rank: String,
    pub amount: i64,
    pub denominations: Vec<i64>,
    /// Cap each value by the stored stock (preview only; dispensing always
    /// uses the stock).
    pub use_inventory: bool,
    pub strategy: Strategy,
    pub save_to_history: bool,
    pub currency: String,
}

impl CalculationRequest {
    pub fn new(amount: i64, denominations: &[i64]) -> Self {
        CalculationRequest {
            name: String::new(),
            rank: String::new(),
            amount,
            denominations: denominations.to_vec(),
            use_inventory: false,
            strategy: Strategy::default(),
            save_to_history: false,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
        }
    }

    pub fn employee(mut self, name: &str, rank: &str) -> Self {
        self.name = name.to_string();
        self.rank = rank.to_string();
        self
    }

    pub fn use_inventory(mut self, use_inventory: bool) -> Self {
        self.use_inventory = use_inventory;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
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

    /// Rejects bad input before any lock or connection is taken.
    fn prepare(&self) -> DbResult<DenominationSet> {
        validate_amount(self.amount)?;
        let set = DenominationSet::new(&self.denominations)?;
        if self.save_to_history {
            validate_name(&self.name)?;
            validate_label("rank", &self.rank)?;
        }
        Ok(set)
    }

    fn history_entry(&self, breakdown: &Breakdown) -> NewCalculation {
        NewCalculation::from_breakdown(&self.name, &self.rank, self.amount, breakdown)
    }
}

/// What a calculation produced and wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationOutcome {
    pub result: BreakdownResult,
    /// Notes removed from stock. Empty for previews and failures.
    pub consumed: Consumption,
    /// The history record, when one was saved.
    pub record: Option<CalculationRecord>,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct CalculationService {
    pool: SqlitePool,
    dispense_lock: Arc<Mutex<()>>,
}

impl CalculationService {
    /// Usually obtained through `Database::calculator`, which shares the
    /// database-wide dispense lock.
    pub fn new(pool: SqlitePool, dispense_lock: Arc<Mutex<()>>) -> Self {
        CalculationService {
            pool,
            dispense_lock,
        }
    }

    /// Computes a breakdown without touching stock.
    ///
    /// With `use_inventory` the result is capped by a stock snapshot. A
    /// successful result is saved to history when requested; failures never
    /// are.
    pub async fn calculate(&self, request: &CalculationRequest) -> DbResult<CalculationOutcome> {
        let denominations = self.prepare_logged(request)?;
        let mut conn = self.pool.acquire().await?;

        let inventory = if request.use_inventory {
            Some(denomination::snapshot(&mut conn, denominations.values()).await?)
        } else {
            None
        };

        let result = plan(
            request.amount,
            &denominations,
            inventory.as_ref(),
            request.strategy,
        )?
        .with_currency(&request.currency);

        let record = match result.as_breakdown() {
            Some(breakdown) if request.save_to_history => {
                Some(calculation::insert(&mut conn, &request.history_entry(breakdown)).await?)
            }
            _ => None,
        };

        debug!(
            amount = request.amount,
            success = result.is_success(),
            notes = result.total_notes(),
            "Calculation previewed"
        );

        Ok(CalculationOutcome {
            result,
            consumed: Consumption::new(),
            record,
        })
    }

    /// Computes a stock-constrained breakdown and removes the notes.
    ///
    /// ## Guarantees
    /// - On a failure result nothing is written and stock is unchanged
    /// - On success the decrement and the optional history row commit
    ///   together, or not at all
    ///
    /// ## Errors
    /// Validation errors before anything runs; `InventoryConflict` if a
    /// guarded decrement misses (the transaction is rolled back).
    pub async fn calculate_and_dispense(
        &self,
        request: &CalculationRequest,
    ) -> DbResult<CalculationOutcome> {
        let denominations = self.prepare_logged(request)?;

        let _guard = self.dispense_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let inventory = denomination::snapshot(&mut tx, denominations.values()).await?;
        let result = plan(
            request.amount,
            &denominations,
            Some(&inventory),
            request.strategy,
        )?
        .with_currency(&request.currency);

        if !result.is_success() {
            warn!(
                amount = request.amount,
                remainder = result.remainder(),
                "Dispense refused, inventory unchanged"
            );
            return Ok(CalculationOutcome {
                result,
                consumed: Consumption::new(),
                record: None,
            });
        }

        let consumed = result.consumption();
        denomination::consume(&mut tx, &consumed).await?;

        let record = match result.as_breakdown() {
            Some(breakdown) if request.save_to_history => {
                Some(calculation::insert(&mut tx, &request.history_entry(breakdown)).await?)
            }
            _ => None,
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            amount = request.amount,
            notes = consumed.total_notes(),
            saved = record.is_some(),
            "Salary dispensed"
        );

        Ok(CalculationOutcome {
            result,
            consumed,
            record,
        })
    }

    fn prepare_logged(&self, request: &CalculationRequest) -> DbResult<DenominationSet> {
        request.prepare().map_err(|err| {
            debug!(amount = request.amount, error = %err, "Calculation request rejected");
            err
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cashplan_core::{BreakdownLine, CoreError, FailureKind, DEFAULT_DENOMINATIONS};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
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
    async fn test_preview_never_touches_stock() {
        let db = db().await;
        db.denominations().set_count(1_000, 1).await.unwrap();

        let request = CalculationRequest::new(2_000, &[1_000, 500]).use_inventory(true);
        let outcome = db.calculator().calculate(&request).await.unwrap();

        assert_eq!(
            outcome.result.lines(),
            &[BreakdownLine::new(1_000, 1), BreakdownLine::new(500, 2)]
        );
        assert!(outcome.consumed.is_empty());
        assert_eq!(count(&db, 1_000).await, 1);
        assert_eq!(count(&db, 500).await, 100);
    }

    #[tokio::test]
    async fn test_preview_unlimited_ignores_stock() {
        let db = db().await;
        db.denominations().set_count(50_000, 0).await.unwrap();

        let request = CalculationRequest::new(100_000, &DEFAULT_DENOMINATIONS);
        let outcome = db.calculator().calculate(&request).await.unwrap();
        assert_eq!(outcome.result.lines(), &[BreakdownLine::new(50_000, 2)]);
    }

    #[tokio::test]
    async fn test_dispense_decrements_and_saves() {
        let db = db().await;
        let request = CalculationRequest::new(1_750, &[1_000, 500, 250])
            .employee("Ali", "Grade 1")
            .save_to_history(true);

        let outcome = db.calculator().calculate_and_dispense(&request).await.unwrap();

        assert!(outcome.result.is_success());
        assert_eq!(outcome.consumed.total_notes(), 3);
        assert_eq!(count(&db, 1_000).await, 99);
        assert_eq!(count(&db, 500).await, 99);
        assert_eq!(count(&db, 250).await, 99);

        let record = outcome.record.unwrap();
        assert_eq!(record.salary, 1_750);
        assert_eq!(db.calculations().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_dispense_changes_nothing() {
        let db = db().await;
        let repo = db.denominations();
        repo.set_count(1_000, 1).await.unwrap();
        repo.set_count(500, 0).await.unwrap();

        let request = CalculationRequest::new(2_000, &[1_000, 500])
            .employee("Ali", "")
            .save_to_history(true);

        for _ in 0..2 {
            let outcome = db.calculator().calculate_and_dispense(&request).await.unwrap();
            match &outcome.result {
                BreakdownResult::Failure(failure) => {
                    assert_eq!(failure.kind, FailureKind::InsufficientSupply);
                    assert_eq!(failure.remainder, 1_000);
                }
                other => panic!("expected failure, got {:?}", other),
            }
            assert!(outcome.record.is_none());
        }

        assert_eq!(count(&db, 1_000).await, 1);
        assert_eq!(count(&db, 500).await, 0);
        assert_eq!(db.calculations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_optimal_dispense_closes_greedy_gap() {
        let db = db().await;
        let repo = db.denominations();
        repo.insert(&cashplan_core::Denomination::new(600, 2)).await.unwrap();
        repo.set_count(1_000, 1).await.unwrap();

        let greedy = CalculationRequest::new(1_200, &[1_000, 600]);
        let outcome = db.calculator().calculate_and_dispense(&greedy).await.unwrap();
        assert_eq!(outcome.result.remainder(), 200);

        let optimal = greedy.strategy(Strategy::Optimal);
        let outcome = db.calculator().calculate_and_dispense(&optimal).await.unwrap();
        assert_eq!(outcome.result.lines(), &[BreakdownLine::new(600, 2)]);
        assert_eq!(count(&db, 600).await, 0);
        assert_eq!(count(&db, 1_000).await, 1);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected_early() {
        let db = db().await;
        let calculator = db.calculator();

        let err = calculator
            .calculate(&CalculationRequest::new(0, &[1_000]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidAmount { .. })));

        let err = calculator
            .calculate_and_dispense(&CalculationRequest::new(1_000, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NoDenominationsSelected)));

        let err = calculator
            .calculate(&CalculationRequest::new(1_000, &[1_000]).save_to_history(true))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = calculator
            .calculate(
                &CalculationRequest::new(5_000_000_000_000_000_000, &[50_000])
                    .employee("Ali", "")
                    .save_to_history(true),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(db.calculations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_currency_is_carried_into_failure_reason() {
        let db = db().await;
        let request = CalculationRequest::new(300, &[250]).currency("USD");
        let outcome = db.calculator().calculate(&request).await.unwrap();
        assert!(outcome.result.message().contains("50 USD"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispenses_never_overdraw() {
        let db = db().await;
        db.denominations().set_count(1_000, 3).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..6 {
            let calculator = db.calculator();
            handles.push(tokio::spawn(async move {
                calculator
                    .calculate_and_dispense(&CalculationRequest::new(1_000, &[1_000]))
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().result.is_success() {
                successes += 1;
            }
        }

        assert_eq!(successes, 3);
        assert_eq!(count(&db, 1_000).await, 0);
    }
}
