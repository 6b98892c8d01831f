//! # Error Types
//!
//! Domain-specific error types for cashplan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cashplan-core errors (this file)                                      │
//! │  ├── CoreError        - Request rejected before any note is counted    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cashplan-db errors (separate crate)                                   │
//! │  └── DbError          - Store and inventory transaction failures       │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - Coded error printed by the binary              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → stderr       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT An Error
//! An amount that cannot be paid out exactly is a normal outcome, reported
//! as [`crate::BreakdownResult::Failure`]. Errors here mean the request
//! itself was malformed.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised before the breakdown algorithm runs; a request that produces one
/// of these never reads or touches inventory.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Target amount is zero or negative.
    #[error("Salary must be greater than 0 (got {amount})")]
    InvalidAmount { amount: i64 },

    /// The caller selected no denominations at all.
    #[error("At least one denomination must be selected")]
    NoDenominationsSelected,

    /// A denomination value is zero or negative.
    #[error("Invalid denomination {value}: values must be positive")]
    InvalidDenomination { value: i64 },

    /// The same denomination was listed twice.
    ///
    /// ## Why Reject Instead Of Dedupe
    /// A duplicated value in an inventory request would otherwise be
    /// consulted twice against one stock count.
    #[error("Duplicate denomination {value}")]
    DuplicateDenomination { value: i64 },

    /// The minimal-note solver would need more table states than allowed.
    #[error(
        "Amount {amount} needs {states} states for the optimal strategy (limit {max}); use the greedy strategy"
    )]
    AmountTooLargeForOptimal { amount: i64, states: i64, max: i64 },

    /// Applying a consumption would drive a stock count below zero.
    #[error("Insufficient notes of {value}: available {available}, requested {requested}")]
    InsufficientNotes {
        value: i64,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
