//! # Calculate Command
//!
//! ```text
//! cashplan calculate <AMOUNT> [--denominations 50000,25000,...]
//!                            [--use-inventory] [--dispense]
//!                            [--strategy greedy|optimal]
//!                            [--name N --rank R --save]
//! ```
//!
//! Without `--dispense` this is a preview and stock is never touched.

use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{format_amount, resolve_denominations};
use crate::error::AppResult;
use crate::state::AppConfig;
use cashplan_core::Strategy;
use cashplan_db::{CalculationOutcome, CalculationRequest, Database};

#[derive(Args, Debug, Clone)]
pub struct CalculateArgs {
    /// Salary to split, in whole currency units.
    pub amount: i64,

    /// Comma-separated note values. Default: every available denomination.
    #[arg(long, short, value_delimiter = ',')]
    pub denominations: Vec<i64>,

    /// Cap each note by the stock on hand.
    #[arg(long)]
    pub use_inventory: bool,

    /// Remove the notes from stock (implies --use-inventory).
    #[arg(long)]
    pub dispense: bool,

    /// Default: `calculation.strategy` from the config.
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Employee name (required with --save).
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub rank: String,

    /// Save a successful result to history.
    #[arg(long)]
    pub save: bool,
}

/// Printed result of `calculate`.
#[derive(Debug, Serialize)]
pub struct CalculationView {
    pub message: String,
    pub amount: String,
    pub dispensed: bool,
    #[serde(flatten)]
    pub outcome: CalculationOutcome,
}

pub async fn run(
    db: &Database,
    config: &AppConfig,
    args: CalculateArgs,
) -> AppResult<CalculationView> {
    let denominations = resolve_denominations(db, &args.denominations).await?;
    let currency = config.currency_code();

    let request = CalculationRequest::new(args.amount, &denominations)
        .employee(&args.name, &args.rank)
        .use_inventory(args.use_inventory || args.dispense)
        .strategy(args.strategy.unwrap_or(config.calculation.strategy))
        .save_to_history(args.save)
        .currency(currency);

    let calculator = db.calculator();
    let outcome = if args.dispense {
        calculator.calculate_and_dispense(&request).await?
    } else {
        calculator.calculate(&request).await?
    };

    info!(
        amount = args.amount,
        success = outcome.result.is_success(),
        dispensed = args.dispense,
        "calculate finished"
    );

    Ok(CalculationView {
        message: outcome.result.message().to_string(),
        amount: format_amount(args.amount, currency),
        dispensed: args.dispense && outcome.result.is_success(),
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashplan_db::DbConfig;

    fn args(amount: i64) -> CalculateArgs {
        CalculateArgs {
            amount,
            denominations: Vec::new(),
            use_inventory: false,
            dispense: false,
            strategy: None,
            name: String::new(),
            rank: String::new(),
            save: false,
        }
    }

    #[tokio::test]
    async fn test_preview_uses_available_denominations() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.denominations().set_available(50_000, false).await.unwrap();

        let view = run(&db, &AppConfig::default(), args(100_000)).await.unwrap();
        assert_eq!(view.amount, "100,000 IQD");
        assert_eq!(view.outcome.result.total_notes(), 4);
        assert!(!view.dispensed);
    }

    #[tokio::test]
    async fn test_dispense_with_save() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut input = args(1_750);
        input.denominations = vec![1_000, 500, 250];
        input.dispense = true;
        input.save = true;
        input.name = "Ali".to_string();

        let view = run(&db, &AppConfig::default(), input).await.unwrap();
        assert!(view.dispensed);
        assert_eq!(view.message, "Calculation successful");
        assert!(view.outcome.record.is_some());
        assert_eq!(
            db.denominations().get(250).await.unwrap().unwrap().available_count,
            99
        );
    }

    #[tokio::test]
    async fn test_failure_is_output_not_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut input = args(300);
        input.denominations = vec![250];

        let view = run(&db, &AppConfig::default(), input).await.unwrap();
        assert_eq!(view.outcome.result.remainder(), 50);
        assert!(view.message.starts_with("Cannot make exact change"));
    }
}
