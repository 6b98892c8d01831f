//! # Inventory Commands
//!
//! ```text
//! cashplan inventory list
//! cashplan inventory set <VALUE> <COUNT>
//! cashplan inventory restock <VALUE> <QUANTITY>
//! cashplan inventory enable|disable <VALUE>
//! cashplan inventory add <VALUE> [--count N]
//! cashplan inventory reset [--count N]
//! cashplan inventory alerts [--all]
//! ```

use clap::{Args, Subcommand};
use serde::Serialize;

use super::format_amount;
use crate::error::{AppError, AppResult};
use crate::state::AppConfig;
use cashplan_core::inventory::stock_alerts;
use cashplan_core::{Denomination, Inventory, StockAlert, StockLevel};
use cashplan_db::Database;

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[command(subcommand)]
    pub command: InventoryCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum InventoryCommand {
    /// Every denomination with its stock.
    List,
    /// Overwrite the stock of one denomination.
    Set { value: i64, count: i64 },
    /// Add notes to one denomination.
    Restock { value: i64, quantity: i64 },
    /// Offer a denomination for calculations.
    Enable { value: i64 },
    /// Stop offering a denomination.
    Disable { value: i64 },
    /// Register a new denomination.
    Add {
        value: i64,
        /// Default: `calculation.default_inventory`.
        #[arg(long)]
        count: Option<i64>,
    },
    /// Set every denomination to the same count.
    Reset {
        /// Default: `calculation.default_inventory`.
        #[arg(long)]
        count: Option<i64>,
    },
    /// Denominations at or under the alert thresholds.
    Alerts {
        /// Include denominations that are fine.
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct StockView {
    pub denominations: Vec<Denomination>,
    pub total_notes: i64,
    pub total_value: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InventoryOutput {
    Stock(StockView),
    Denomination(Denomination),
    Reset { count: i64, updated: u64 },
    Alerts { alerts: Vec<StockAlert> },
}

pub async fn run(
    db: &Database,
    config: &AppConfig,
    args: InventoryArgs,
) -> AppResult<InventoryOutput> {
    let repo = db.denominations();

    let touched = match args.command {
        InventoryCommand::List => {
            let denominations = repo.list().await?;
            let inventory = Inventory::from_denominations(&denominations);
            return Ok(InventoryOutput::Stock(StockView {
                total_notes: denominations.iter().map(|d| d.available_count).sum(),
                total_value: format_amount(inventory.total_value().units(), config.currency_code()),
                denominations,
            }));
        }
        InventoryCommand::Reset { count } => {
            let count = count.unwrap_or(config.calculation.default_inventory);
            let updated = repo.reset_counts(count).await?;
            return Ok(InventoryOutput::Reset { count, updated });
        }
        InventoryCommand::Alerts { all } => {
            let denominations = repo.list().await?;
            let alerts = stock_alerts(&denominations, config.thresholds())
                .into_iter()
                .filter(|alert| all || alert.level != StockLevel::Ok)
                .collect();
            return Ok(InventoryOutput::Alerts { alerts });
        }
        InventoryCommand::Set { value, count } => {
            repo.set_count(value, count).await?;
            value
        }
        InventoryCommand::Restock { value, quantity } => {
            repo.restock(value, quantity).await?;
            value
        }
        InventoryCommand::Enable { value } => {
            repo.set_available(value, true).await?;
            value
        }
        InventoryCommand::Disable { value } => {
            repo.set_available(value, false).await?;
            value
        }
        InventoryCommand::Add { value, count } => {
            let count = count.unwrap_or(config.calculation.default_inventory);
            repo.insert(&Denomination::new(value, count)).await?;
            value
        }
    };

    let denomination = repo
        .get(touched)
        .await?
        .ok_or_else(|| AppError::not_found("Denomination", &touched.to_string()))?;
    Ok(InventoryOutput::Denomination(denomination))
}
