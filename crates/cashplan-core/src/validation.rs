//! # Validation Module
//!
//! Input validation utilities for cashplan.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI (clap)                                                   │
//! │  ├── Type parsing (integers, enums, paths)                             │
//! │  └── Required arguments                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Core (Rust)                                                  │
//! │  ├── THIS MODULE: labels, counts, ids, thresholds                      │
//! │  └── DenominationSet::new: amounts and note values                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── PRIMARY KEY on denomination value                                 │
//! │  └── CHECK (available_count >= 0)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashplan_core::validation::{validate_name, validate_inventory_count};
//!
//! validate_name("Ali Hassan").unwrap();
//! validate_inventory_count(100).unwrap();
//! assert!(validate_inventory_count(-1).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{MAX_LABEL_LENGTH, MAX_SALARY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a history search query.
const MAX_QUERY_LENGTH: usize = 100;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a target amount before any breakdown runs.
///
/// ## Rules
/// - Must be strictly positive
/// - Must not exceed [`MAX_SALARY`]
///
/// ## Example
/// ```rust
/// use cashplan_core::validation::validate_amount;
///
/// assert!(validate_amount(1750).is_ok());
/// assert!(validate_amount(0).is_err());
/// assert!(validate_amount(5_000_000_000_000_000_000).is_err());
/// ```
pub fn validate_amount(amount: i64) -> CoreResult<()> {
    if amount <= 0 {
        return Err(CoreError::InvalidAmount { amount });
    }

    if amount > MAX_SALARY {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: MAX_SALARY,
        }
        .into());
    }

    Ok(())
}

/// Validates a salary stored on a template or history record.
///
/// Same bounds as [`validate_amount`].
pub fn validate_salary(salary: i64) -> ValidationResult<()> {
    if salary <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "salary".to_string(),
        });
    }

    if salary > MAX_SALARY {
        return Err(ValidationError::OutOfRange {
            field: "salary".to_string(),
            min: 1,
            max: MAX_SALARY,
        });
    }

    Ok(())
}

/// Validates a note count written to the inventory.
///
/// ## Rules
/// - Zero is allowed (denomination exhausted)
/// - Negative counts are rejected
pub fn validate_inventory_count(count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "available_count".to_string(),
        });
    }
    Ok(())
}

/// Validates a restock quantity (notes added to an existing count).
pub fn validate_restock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an employee or template name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_LABEL_LENGTH`] characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    validate_label("name", name)
}

/// Validates an optional label such as rank or department.
///
/// Empty is allowed; only the length is bounded.
pub fn validate_label(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().chars().count() > MAX_LABEL_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_LABEL_LENGTH,
        });
    }
    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use cashplan_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Threshold Validators
// =============================================================================

/// Validates inventory alert thresholds.
///
/// ## Rules
/// - Both thresholds non-negative
/// - Critical must not exceed low
pub fn validate_thresholds(low: i64, critical: i64) -> ValidationResult<()> {
    if critical < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "critical_threshold".to_string(),
        });
    }
    if low < critical {
        return Err(ValidationError::OutOfRange {
            field: "low_threshold".to_string(),
            min: critical,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(1_250_000).is_ok());
        assert!(matches!(
            validate_amount(0),
            Err(CoreError::InvalidAmount { amount: 0 })
        ));
        assert!(validate_amount(-250).is_err());
    }

    #[test]
    fn test_amount_and_salary_are_bounded() {
        assert!(validate_amount(MAX_SALARY).is_ok());
        assert!(matches!(
            validate_amount(MAX_SALARY + 1),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(validate_amount(5_000_000_000_000_000_000).is_err());

        assert!(validate_salary(MAX_SALARY).is_ok());
        assert!(matches!(
            validate_salary(5_000_000_000_000_000_000),
            Err(ValidationError::OutOfRange { max: MAX_SALARY, .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Senior Engineer").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_label() {
        assert!(validate_label("rank", "").is_ok());
        assert!(validate_label("rank", "Grade 1").is_ok());
        assert!(validate_label("department", &"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_counts() {
        assert!(validate_inventory_count(0).is_ok());
        assert!(validate_inventory_count(100).is_ok());
        assert!(validate_inventory_count(-1).is_err());

        assert!(validate_restock_quantity(5).is_ok());
        assert!(validate_restock_quantity(0).is_err());

        assert!(validate_salary(750_000).is_ok());
        assert!(validate_salary(0).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  Ali ").unwrap(), "Ali");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }

    #[test]
    fn test_validate_thresholds() {
        assert!(validate_thresholds(20, 10).is_ok());
        assert!(validate_thresholds(10, 10).is_ok());
        assert!(validate_thresholds(5, 10).is_err());
        assert!(validate_thresholds(20, -1).is_err());
    }
}
