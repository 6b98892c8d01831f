//! # Service Module
//!
//! Operations that span more than one table or must hold the dispense lock.
//!
//! ## Dispense Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lock dispense_lock                                                     │
//! │    BEGIN                                                                │
//! │      snapshot  ← denominations (same transaction)                       │
//! │      plan      ← pure core algorithm over the snapshot                  │
//! │      failure?  → drop transaction, nothing written                      │
//! │      consume   ← guarded decrements                                     │
//! │      insert    ← history rows (optional)                                │
//! │    COMMIT                                                               │
//! │  unlock                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`CalculationService`](calculation::CalculationService) - One salary
//! - [`BatchRunner`](batch::BatchRunner) - A list of employees

pub mod batch;
pub mod calculation;
