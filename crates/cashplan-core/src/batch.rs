//! # Batch Module
//!
//! Runs the breakdown for a list of employees and totals the outcome.
//!
//! ## Inventory Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two employees × 500, stock {500: 1}                                    │
//! │                                                                         │
//! │  unlimited  stock ignored            → success, success                 │
//! │  snapshot   each sees {500: 1}       → success, success  (overdrawn!)   │
//! │  running    stock shrinks per entry  → success, failure                 │
//! │                                                                         │
//! │  Only `running` guarantees the combined consumption fits the stock.     │
//! │  A `snapshot` report lists its shortfalls and must not be persisted     │
//! │  while any exist.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::breakdown::{plan, Breakdown, BreakdownResult, DenominationSet, Strategy};
use crate::error::{CoreResult, ValidationError};
use crate::inventory::{Consumption, Inventory, Shortfall};
use crate::types::SalaryTemplate;

// =============================================================================
// Input
// =============================================================================

/// One entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub department: String,
    pub salary: i64,
}

impl Employee {
    pub fn new(name: &str, rank: &str, department: &str, salary: i64) -> Self {
        Employee {
            name: name.to_string(),
            rank: rank.to_string(),
            department: department.to_string(),
            salary,
        }
    }

    /// Rank as written to history: `rank - department`, or just the rank
    /// when there is no department.
    pub fn history_rank(&self) -> String {
        if self.department.trim().is_empty() {
            self.rank.clone()
        } else {
            format!("{} - {}", self.rank, self.department)
        }
    }
}

impl From<&SalaryTemplate> for Employee {
    fn from(template: &SalaryTemplate) -> Self {
        Employee {
            name: template.name.clone(),
            rank: template.rank.clone(),
            department: template.department.clone(),
            salary: template.salary,
        }
    }
}

/// How a batch treats note stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryMode {
    /// Stock is ignored and never written.
    Unlimited,
    /// Every entry is checked against the initial stock.
    Snapshot,
    /// Each success reduces the stock seen by later entries.
    #[default]
    Running,
}

impl fmt::Display for InventoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryMode::Unlimited => write!(f, "unlimited"),
            InventoryMode::Snapshot => write!(f, "snapshot"),
            InventoryMode::Running => write!(f, "running"),
        }
    }
}

impl FromStr for InventoryMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unlimited" => Ok(InventoryMode::Unlimited),
            "snapshot" => Ok(InventoryMode::Snapshot),
            "running" => Ok(InventoryMode::Running),
            _ => Err(ValidationError::NotAllowed {
                field: "inventory_mode".to_string(),
                allowed: vec![
                    "unlimited".to_string(),
                    "snapshot".to_string(),
                    "running".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// The breakdown ran; the result may still be a failure.
    Calculated { result: BreakdownResult },
    /// The entry was invalid (e.g. a non-positive salary).
    Rejected { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub employee: Employee,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchItem {
    pub fn breakdown(&self) -> Option<&Breakdown> {
        match &self.outcome {
            BatchOutcome::Calculated { result } => result.as_breakdown(),
            BatchOutcome::Rejected { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.breakdown().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_employees: usize,
    pub successful: usize,
    pub failed: usize,
    /// Sum over every entry, successful or not.
    pub total_salary: i64,
    /// Notes over successful entries only.
    pub total_notes: i64,
    /// Notes per value over successful entries only.
    pub denomination_totals: Consumption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub mode: InventoryMode,
    pub strategy: Strategy,
    pub items: Vec<BatchItem>,
    pub summary: BatchSummary,
    /// Notes to remove from stock if the batch is persisted.
    pub consumption: Consumption,
    /// Values the consumption would overdraw (snapshot mode only).
    pub overdrawn: Vec<Shortfall>,
}

impl BatchReport {
    /// Whether the consumption fits the stock the batch started from.
    pub fn can_persist(&self) -> bool {
        self.overdrawn.is_empty()
    }

    /// Successful entries with their breakdowns, in input order.
    pub fn successes(&self) -> impl Iterator<Item = (&Employee, &Breakdown)> + '_ {
        self.items
            .iter()
            .filter_map(|item| item.breakdown().map(|b| (&item.employee, b)))
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Runs every entry in order.
///
/// `inventory` is the stock snapshot at the start of the batch and is not
/// modified; the report carries the consumption to persist.
///
/// ## Errors
/// An empty employee list. Per-entry problems become
/// [`BatchOutcome::Rejected`] and never abort the batch.
pub fn run_batch(
    employees: &[Employee],
    denominations: &DenominationSet,
    inventory: &Inventory,
    mode: InventoryMode,
    strategy: Strategy,
) -> CoreResult<BatchReport> {
    if employees.is_empty() {
        return Err(ValidationError::Required {
            field: "employees".to_string(),
        }
        .into());
    }

    let mut running = inventory.clone();
    let mut items = Vec::with_capacity(employees.len());
    let mut summary = BatchSummary {
        total_employees: employees.len(),
        ..BatchSummary::default()
    };

    for employee in employees {
        summary.total_salary = summary.total_salary.saturating_add(employee.salary);

        let stock = match mode {
            InventoryMode::Unlimited => None,
            InventoryMode::Snapshot => Some(inventory),
            InventoryMode::Running => Some(&running),
        };

        let outcome = match plan(employee.salary, denominations, stock, strategy) {
            Ok(result) => BatchOutcome::Calculated { result },
            Err(err) => BatchOutcome::Rejected {
                error: err.to_string(),
            },
        };

        if let BatchOutcome::Calculated {
            result: BreakdownResult::Success(breakdown),
        } = &outcome
        {
            let consumption = breakdown.consumption();
            if mode == InventoryMode::Running {
                running.apply(&consumption)?;
            }
            summary.successful += 1;
            summary.total_notes = summary.total_notes.saturating_add(breakdown.total_notes);
            summary.denomination_totals.merge(&consumption);
        } else {
            summary.failed += 1;
        }

        items.push(BatchItem {
            employee: employee.clone(),
            outcome,
        });
    }

    let (consumption, overdrawn) = match mode {
        InventoryMode::Unlimited => (Consumption::new(), Vec::new()),
        InventoryMode::Snapshot => (
            summary.denomination_totals.clone(),
            summary.denomination_totals.overdraws(inventory),
        ),
        InventoryMode::Running => (summary.denomination_totals.clone(), Vec::new()),
    };

    Ok(BatchReport {
        mode,
        strategy,
        items,
        summary,
        consumption,
        overdrawn,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::{BreakdownLine, FailureKind};

    fn set(values: &[i64]) -> DenominationSet {
        DenominationSet::new(values).unwrap()
    }

    fn two_at_500() -> Vec<Employee> {
        vec![
            Employee::new("Ali", "Grade 1", "", 500),
            Employee::new("Sara", "Grade 2", "Finance", 500),
        ]
    }

    #[test]
    fn test_snapshot_mode_lets_entries_share_scarce_notes() {
        let inventory: Inventory = [(500, 1)].into_iter().collect();
        let report = run_batch(
            &two_at_500(),
            &set(&[500]),
            &inventory,
            InventoryMode::Snapshot,
            Strategy::Greedy,
        )
        .unwrap();

        assert_eq!(report.summary.successful, 2);
        assert_eq!(report.summary.denomination_totals.get(500), 2);
        assert!(!report.can_persist());
        assert_eq!(report.overdrawn[0].requested, 2);
        assert_eq!(report.overdrawn[0].available, 1);
    }

    #[test]
    fn test_running_mode_threads_stock_through_entries() {
        let inventory: Inventory = [(500, 1)].into_iter().collect();
        let report = run_batch(
            &two_at_500(),
            &set(&[500]),
            &inventory,
            InventoryMode::Running,
            Strategy::Greedy,
        )
        .unwrap();

        assert_eq!(report.summary.successful, 1);
        assert_eq!(report.summary.failed, 1);
        assert!(report.can_persist());
        assert_eq!(report.consumption.get(500), 1);

        match &report.items[1].outcome {
            BatchOutcome::Calculated {
                result: BreakdownResult::Failure(failure),
            } => assert_eq!(failure.kind, FailureKind::InsufficientSupply),
            other => panic!("expected supply failure, got {:?}", other),
        }
        // input snapshot untouched
        assert_eq!(inventory.available(500), 1);
    }

    #[test]
    fn test_unlimited_mode_ignores_stock() {
        let report = run_batch(
            &two_at_500(),
            &set(&[500]),
            &Inventory::new(),
            InventoryMode::Unlimited,
            Strategy::Greedy,
        )
        .unwrap();

        assert_eq!(report.summary.successful, 2);
        assert!(report.consumption.is_empty());
        assert!(report.can_persist());
    }

    #[test]
    fn test_summary_counts_salary_of_every_entry() {
        let employees = vec![
            Employee::new("A", "", "", 1_750),
            Employee::new("B", "", "", 300),
            Employee::new("C", "", "", 0),
        ];
        let report = run_batch(
            &employees,
            &set(&[1_000, 500, 250]),
            &Inventory::new(),
            InventoryMode::Unlimited,
            Strategy::Greedy,
        )
        .unwrap();

        let summary = &report.summary;
        assert_eq!(summary.total_employees, 3);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total_salary, 2_050);
        assert_eq!(summary.total_notes, 3);
        assert_eq!(
            summary.denomination_totals.lines(),
            vec![
                BreakdownLine::new(1_000, 1),
                BreakdownLine::new(500, 1),
                BreakdownLine::new(250, 1)
            ]
        );
        assert!(matches!(
            report.items[2].outcome,
            BatchOutcome::Rejected { .. }
        ));
        assert_eq!(report.successes().count(), 1);
    }

    #[test]
    fn test_oversized_salaries_are_rejected_without_overflow() {
        let employees = vec![
            Employee::new("A", "", "", 5_000_000_000_000_000_000),
            Employee::new("B", "", "", 5_000_000_000_000_000_000),
            Employee::new("C", "", "", crate::MAX_SALARY),
            Employee::new("D", "", "", crate::MAX_SALARY),
        ];
        let report = run_batch(
            &employees,
            &set(&[50_000]),
            &Inventory::new(),
            InventoryMode::Unlimited,
            Strategy::Greedy,
        )
        .unwrap();

        assert!(matches!(
            report.items[0].outcome,
            BatchOutcome::Rejected { .. }
        ));
        assert!(matches!(
            report.items[1].outcome,
            BatchOutcome::Rejected { .. }
        ));
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.successful, 2);
        assert_eq!(report.summary.total_salary, i64::MAX);
        assert_eq!(report.summary.total_notes, 2 * 20_000_000);
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let result = run_batch(
            &[],
            &set(&[500]),
            &Inventory::new(),
            InventoryMode::Running,
            Strategy::Greedy,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_history_rank() {
        assert_eq!(
            Employee::new("A", "Grade 2", "Finance", 1).history_rank(),
            "Grade 2 - Finance"
        );
        assert_eq!(Employee::new("A", "Grade 2", "", 1).history_rank(), "Grade 2");
    }

    #[test]
    fn test_inventory_mode_parse() {
        assert_eq!("Snapshot".parse::<InventoryMode>().unwrap(), InventoryMode::Snapshot);
        assert_eq!(InventoryMode::default(), InventoryMode::Running);
        assert!("shared".parse::<InventoryMode>().is_err());
        assert_eq!(InventoryMode::Unlimited.to_string(), "unlimited");
    }
}
