//! # Batch Command
//!
//! ```text
//! cashplan batch (--file employees.json | --templates)
//!                [--mode unlimited|snapshot|running] [--strategy ...]
//!                [--persist] [--save]
//! ```
//!
//! ## Input File
//! ```json
//! [
//!   {"name": "Ali", "rank": "Grade 1", "department": "Finance", "salary": 1250000},
//!   {"name": "Sara", "salary": 980000}
//! ]
//! ```

use clap::Args;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::resolve_denominations;
use crate::error::{AppError, AppResult};
use crate::state::AppConfig;
use cashplan_core::batch::{Employee, InventoryMode};
use cashplan_core::Strategy;
use cashplan_db::{BatchRequest, BatchRun, Database};

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// JSON file with an array of employees.
    #[arg(long, conflicts_with = "templates", required_unless_present = "templates")]
    pub file: Option<PathBuf>,

    /// Use every saved salary template.
    #[arg(long)]
    pub templates: bool,

    #[arg(long, short, value_delimiter = ',')]
    pub denominations: Vec<i64>,

    /// Default: `batch.mode` from the config.
    #[arg(long)]
    pub mode: Option<InventoryMode>,

    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Remove the batch consumption from stock.
    #[arg(long)]
    pub persist: bool,

    /// Save successful entries to history. Default: `batch.save_to_history`.
    #[arg(long)]
    pub save: bool,
}

pub async fn run(db: &Database, config: &AppConfig, args: BatchArgs) -> AppResult<BatchRun> {
    let employees = match &args.file {
        Some(path) => read_employees(path)?,
        None => {
            let templates = db.templates().list().await?;
            templates.iter().map(Employee::from).collect()
        }
    };
    debug!(employees = employees.len(), "Batch input loaded");

    let denominations = resolve_denominations(db, &args.denominations).await?;

    let request = BatchRequest::new(employees, &denominations)
        .mode(args.mode.unwrap_or(config.batch.mode))
        .strategy(args.strategy.unwrap_or(config.calculation.strategy))
        .persist(args.persist)
        .save_to_history(args.save || config.batch.save_to_history)
        .currency(config.currency_code());

    let run = db.batch_runner().run(&request).await?;

    info!(
        successful = run.report.summary.successful,
        failed = run.report.summary.failed,
        persisted = run.persisted,
        "batch finished"
    );
    Ok(run)
}

/// Reads a JSON array of employees.
pub fn read_employees(path: &Path) -> AppResult<Vec<Employee>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::input(format!("Cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| AppError::input(format!("Invalid employee file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashplan_core::NewTemplate;
    use cashplan_db::DbConfig;

    fn args() -> BatchArgs {
        BatchArgs {
            file: None,
            templates: true,
            denominations: Vec::new(),
            mode: None,
            strategy: None,
            persist: false,
            save: false,
        }
    }

    #[tokio::test]
    async fn test_batch_from_templates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.templates()
            .create(&NewTemplate::new("Teacher - High School", "Senior", "Education", 750_000))
            .await
            .unwrap();

        let run = run(&db, &AppConfig::default(), args()).await.unwrap();
        assert_eq!(run.report.mode, InventoryMode::Running);
        assert_eq!(run.report.summary.successful, 1);
        assert_eq!(run.report.summary.total_notes, 15);
        assert!(!run.persisted);
    }

    #[tokio::test]
    async fn test_empty_template_list_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = run(&db, &AppConfig::default(), args()).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }

    #[test]
    fn test_read_employees_missing_file() {
        let err = read_employees(Path::new("/nonexistent/employees.json")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InputError);
    }
}
