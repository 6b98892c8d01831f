//! # History Commands
//!
//! ```text
//! cashplan history list [--limit N]
//! cashplan history get <ID>
//! cashplan history search <QUERY>
//! cashplan history update <ID> [--name N] [--rank R] [--salary S [-d ...]]
//! cashplan history delete <ID>
//! ```
//!
//! Changing the salary recomputes the stored breakdown with the unlimited
//! algorithm; stock is not touched by history edits.

use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

use super::resolve_denominations;
use crate::error::{AppError, AppResult};
use cashplan_core::breakdown::calculate;
use cashplan_core::{BreakdownResult, CalculationRecord, NewCalculation};
use cashplan_db::Database;

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// Newest first.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    Get { id: String },
    /// Substring match on name or rank.
    Search { query: String },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        rank: Option<String>,
        #[arg(long)]
        salary: Option<i64>,
        /// Notes for the recomputed breakdown. Default: available values.
        #[arg(long, short, value_delimiter = ',')]
        denominations: Vec<i64>,
    },
    Delete { id: String },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HistoryOutput {
    Records {
        count: usize,
        records: Vec<CalculationRecord>,
    },
    Record(CalculationRecord),
    Deleted {
        deleted: String,
    },
}

impl HistoryOutput {
    fn records(records: Vec<CalculationRecord>) -> Self {
        HistoryOutput::Records {
            count: records.len(),
            records,
        }
    }
}

pub async fn run(db: &Database, args: HistoryArgs) -> AppResult<HistoryOutput> {
    let repo = db.calculations();

    match args.command {
        HistoryCommand::List { limit } => Ok(HistoryOutput::records(repo.list(limit).await?)),
        HistoryCommand::Search { query } => Ok(HistoryOutput::records(repo.search(&query).await?)),
        HistoryCommand::Get { id } => {
            let record = repo
                .get(&id)
                .await?
                .ok_or_else(|| AppError::not_found("Calculation", &id))?;
            Ok(HistoryOutput::Record(record))
        }
        HistoryCommand::Update {
            id,
            name,
            rank,
            salary,
            denominations,
        } => {
            let current = repo
                .get(&id)
                .await?
                .ok_or_else(|| AppError::not_found("Calculation", &id))?;

            let mut entry = NewCalculation {
                name: name.unwrap_or(current.name),
                rank: rank.unwrap_or(current.rank),
                salary: current.salary,
                breakdown: current.breakdown,
                total_notes: current.total_notes,
            };

            if let Some(salary) = salary {
                let values = resolve_denominations(db, &denominations).await?;
                match calculate(salary, &values)? {
                    BreakdownResult::Success(breakdown) => {
                        entry.salary = salary;
                        entry.breakdown = breakdown.lines;
                        entry.total_notes = breakdown.total_notes;
                    }
                    BreakdownResult::Failure(failure) => {
                        return Err(AppError::validation(failure.reason));
                    }
                }
            }

            let record = repo.update(&id, &entry).await?;
            info!(id = %id, "history record updated");
            Ok(HistoryOutput::Record(record))
        }
        HistoryCommand::Delete { id } => {
            repo.delete(&id).await?;
            Ok(HistoryOutput::Deleted { deleted: id })
        }
    }
}
