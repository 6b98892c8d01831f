//! # Repository Module
//!
//! Database repository implementations for cashplan.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                            │
//! │       │  db.denominations().set_count(500, 40)                          │
//! │       ▼                                                                 │
//! │  DenominationRepository / CalculationRepository / TemplateRepository   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Statements that must join a caller's transaction are also exposed as  │
//! │  free functions over `&mut SqliteConnection` (snapshot, consume,       │
//! │  insert); the services call those inside one transaction.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`DenominationRepository`](denomination::DenominationRepository) - Note stock
//! - [`CalculationRepository`](calculation::CalculationRepository) - History
//! - [`TemplateRepository`](template::TemplateRepository) - Salary templates

pub mod calculation;
pub mod denomination;
pub mod template;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 text, so `ORDER BY created_at` follows time order.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
