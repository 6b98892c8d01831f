//! # Domain Types
//!
//! Persisted entities shared by the store and the command line.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌───────────────────┐   ┌─────────────────┐     │
//! │  │  Denomination   │   │ CalculationRecord │   │ SalaryTemplate  │     │
//! │  │  ─────────────  │   │  ───────────────  │   │  ─────────────  │     │
//! │  │  value (PK)     │   │  id (UUID)        │   │  id (UUID)      │     │
//! │  │  image_name     │   │  name, rank       │   │  name, rank     │     │
//! │  │  is_available   │   │  salary           │   │  department     │     │
//! │  │  available_count│   │  breakdown (JSON) │   │  salary         │     │
//! │  └─────────────────┘   │  total_notes      │   └─────────────────┘     │
//! │                        └───────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Denominations are keyed by face value; history and templates use
//! UUID v4 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::breakdown::{Breakdown, BreakdownLine};
use crate::error::CoreResult;
use crate::validation::{validate_label, validate_name, validate_salary};

// =============================================================================
// Denomination
// =============================================================================

/// A banknote denomination held in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Denomination {
    /// Face value in whole currency units. Unique.
    pub value: i64,

    /// Opaque display reference, `<value>.jpg` by default.
    pub image_name: String,

    /// Whether the note is offered for selection.
    pub is_available: bool,

    /// Notes on hand. Never negative.
    pub available_count: i64,
}

impl Denomination {
    /// Creates a denomination with the default image reference.
    pub fn new(value: i64, available_count: i64) -> Self {
        Denomination {
            value,
            image_name: default_image_name(value),
            is_available: true,
            available_count,
        }
    }
}

/// Image reference used for seeded denominations and breakdown lines.
pub fn default_image_name(value: i64) -> String {
    format!("{}.jpg", value)
}

// =============================================================================
// Calculation History
// =============================================================================

/// A saved, successful calculation.
///
/// Only successes are ever written to history, so `breakdown` always sums
/// to `salary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: String,
    pub name: String,
    pub rank: String,
    pub salary: i64,
    pub breakdown: Vec<BreakdownLine>,
    pub total_notes: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields written when inserting or updating a history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCalculation {
    pub name: String,
    #[serde(default)]
    pub rank: String,
    pub salary: i64,
    pub breakdown: Vec<BreakdownLine>,
    pub total_notes: i64,
}

impl NewCalculation {
    /// Builds a history entry from a successful breakdown.
    pub fn from_breakdown(
        name: impl Into<String>,
        rank: impl Into<String>,
        salary: i64,
        breakdown: &Breakdown,
    ) -> Self {
        NewCalculation {
            name: name.into(),
            rank: rank.into(),
            salary,
            breakdown: breakdown.lines.clone(),
            total_notes: breakdown.total_notes,
        }
    }

    /// Checks labels and salary before the record reaches the store.
    pub fn validate(&self) -> CoreResult<()> {
        validate_name(&self.name)?;
        validate_label("rank", &self.rank)?;
        validate_salary(self.salary)?;
        Ok(())
    }
}

// =============================================================================
// Salary Templates
// =============================================================================

/// A reusable employee profile for batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalaryTemplate {
    pub id: String,
    pub name: String,
    pub rank: String,
    pub department: String,
    pub salary: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub department: String,
    pub salary: i64,
}

impl NewTemplate {
    pub fn new(name: &str, rank: &str, department: &str, salary: i64) -> Self {
        NewTemplate {
            name: name.to_string(),
            rank: rank.to_string(),
            department: department.to_string(),
            salary,
        }
    }

    /// Name and a positive salary are required; rank and department may be
    /// empty.
    pub fn validate(&self) -> CoreResult<()> {
        validate_name(&self.name)?;
        validate_label("rank", &self.rank)?;
        validate_label("department", &self.department)?;
        validate_salary(self.salary)?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denomination_defaults() {
        let d = Denomination::new(25_000, 100);
        assert_eq!(d.image_name, "25000.jpg");
        assert!(d.is_available);
        assert_eq!(d.available_count, 100);
    }

    #[test]
    fn test_new_template_validation() {
        assert!(NewTemplate::new("Teacher - High School", "Senior", "Education", 750_000)
            .validate()
            .is_ok());
        assert!(NewTemplate::new("", "", "", 750_000).validate().is_err());
        assert!(NewTemplate::new("Clerk", "", "", 0).validate().is_err());
    }

    #[test]
    fn test_new_calculation_from_breakdown() {
        let breakdown = Breakdown::from_lines(vec![
            BreakdownLine::new(1_000, 1),
            BreakdownLine::new(500, 1),
        ]);
        let entry = NewCalculation::from_breakdown("Ali", "Grade 1", 1_500, &breakdown);
        assert_eq!(entry.total_notes, 2);
        assert_eq!(entry.breakdown.len(), 2);
        assert!(entry.validate().is_ok());
    }
}
