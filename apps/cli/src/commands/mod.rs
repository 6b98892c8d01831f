//! # Commands Module
//!
//! One module per `cashplan` subcommand.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (shared helpers)
//! ├── calculate.rs  ◄─── Preview or dispense one salary
//! ├── batch.rs      ◄─── Payroll batches from a file or the templates
//! ├── inventory.rs  ◄─── Note stock, availability, alerts
//! ├── history.rs    ◄─── Saved calculations
//! ├── templates.rs  ◄─── Salary templates
//! ├── analytics.rs  ◄─── Aggregates over history
//! └── status.rs     ◄─── Database status
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  $ cashplan calculate 1250000 --name Ali --dispense                     │
//! │         │                                                               │
//! │         ▼  (clap derive)                                                │
//! │  CalculateArgs { amount: 1250000, name: Some("Ali"), dispense: true }   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::calculate::run(&db, &config, args)                          │
//! │      -> AppResult<CalculationView>                                      │
//! │         │                                                               │
//! │         ▼  (serde_json, pretty)                                         │
//! │  stdout                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod analytics;
pub mod batch;
pub mod calculate;
pub mod history;
pub mod inventory;
pub mod status;
pub mod templates;

use tracing::debug;

use crate::error::AppResult;
use cashplan_core::Amount;
use cashplan_db::Database;

/// The denominations to use: the explicit list, or every value flagged
/// available in the store.
pub(crate) async fn resolve_denominations(db: &Database, explicit: &[i64]) -> AppResult<Vec<i64>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    let values = db.denominations().available_values().await?;
    debug!(?values, "Using available denominations");
    Ok(values)
}

/// `1,250,000 IQD`
pub(crate) fn format_amount(units: i64, currency: &str) -> String {
    format!("{} {}", Amount::from_units(units), currency)
}
