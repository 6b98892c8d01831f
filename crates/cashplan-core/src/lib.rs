//! # cashplan-core: Pure Breakdown Engine
//!
//! This crate is the **heart** of cashplan. It turns a salary into an exact
//! set of banknotes, with or without a finite note inventory, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        cashplan Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/cli (clap)                              │   │
//! │  │    calculate, batch, inventory, history, templates, analytics   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               cashplan-db (store + CalculationService)          │   │
//! │  │      snapshot ──► decide (this crate) ──► guarded decrement     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cashplan-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ breakdown │  │ inventory │  │   batch   │  │ analytics │  │   │
//! │  │   │  greedy   │  │ snapshot  │  │  runner   │  │  history  │  │   │
//! │  │   │  optimal  │  │ consume   │  │  summary  │  │  stats    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`amount`] - Whole-unit currency amount type
//! - [`types`] - Persisted entities (Denomination, CalculationRecord, ...)
//! - [`breakdown`] - Greedy breakdown algorithms and result types
//! - [`optimal`] - Opt-in minimal-note solver
//! - [`inventory`] - Inventory snapshots, consumption maps, stock alerts
//! - [`batch`] - Batch runner over many employees
//! - [`analytics`] - Aggregation over calculation history
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cashplan_core::breakdown::calculate;
//!
//! let result = calculate(1750, &[1000, 500, 250]).unwrap();
//! assert!(result.is_success());
//! assert_eq!(result.total_notes(), 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod analytics;
pub mod batch;
pub mod breakdown;
pub mod error;
pub mod inventory;
pub mod optimal;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use amount::Amount;
pub use breakdown::{
    Breakdown, BreakdownFailure, BreakdownLine, BreakdownResult, DenominationSet, FailureKind,
    Strategy,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::{AlertThresholds, Consumption, Inventory, StockAlert, StockLevel};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency code appended to amounts in failure reasons.
pub const DEFAULT_CURRENCY_CODE: &str = "IQD";

/// Banknote values seeded into a fresh store (Iraqi dinar series).
pub const DEFAULT_DENOMINATIONS: [i64; 7] = [50_000, 25_000, 10_000, 5_000, 1_000, 500, 250];

/// Note count each denomination starts with, and returns to on reset.
pub const DEFAULT_INVENTORY_COUNT: i64 = 100;

/// Stock at or below this level is reported as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 20;

/// Stock at or below this level is reported as critical.
pub const DEFAULT_CRITICAL_STOCK_THRESHOLD: i64 = 10;

/// Maximum length of employee names, ranks and departments.
pub const MAX_LABEL_LENGTH: usize = 200;

/// Largest amount a single calculation or salary may carry (one trillion).
///
/// Keeps history and batch totals far inside `i64`.
pub const MAX_SALARY: i64 = 1_000_000_000_000;
