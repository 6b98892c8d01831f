//! # cashplan-db: Store and Dispensing Layer
//!
//! SQLite persistence for cashplan: note inventory, calculation history and
//! salary templates, plus the services that dispense salaries against the
//! inventory.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        cashplan Data Flow                               │
//! │                                                                         │
//! │  CLI command (cashplan calculate --dispense)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   cashplan-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Database    │   │   Services     │   │  Repositories │   │   │
//! │  │   │   (pool.rs)   │   │                │   │               │   │   │
//! │  │   │               │   │ Calculation    │──►│ Denomination  │   │   │
//! │  │   │ SqlitePool    │◄──│ BatchRunner    │   │ Calculation   │   │   │
//! │  │   │ dispense_lock │   │                │   │ Template      │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │           │                   │                                 │   │
//! │  │           │                   ▼                                 │   │
//! │  │           │            cashplan-core (pure breakdown)           │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   denominations · calculations · salary_templates               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, dispense lock and status
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Table-level operations
//! - [`service`] - Locked, transactional calculations and batches
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cashplan_db::{CalculationRequest, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("cashplan.db")).await?;
//!
//! let request = CalculationRequest::new(1_250_000, &db.denominations().available_values().await?)
//!     .employee("Ali", "Grade 1")
//!     .save_to_history(true);
//! let outcome = db.calculator().calculate_and_dispense(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbStatus};

// Repository re-exports for convenience
pub use repository::calculation::CalculationRepository;
pub use repository::denomination::DenominationRepository;
pub use repository::template::TemplateRepository;

pub use service::batch::{BatchRequest, BatchRun, BatchRunner};
pub use service::calculation::{CalculationOutcome, CalculationRequest, CalculationService};
