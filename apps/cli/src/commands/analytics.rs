//! # Analytics Command
//!
//! `cashplan analytics` aggregates the whole calculation history.

use tracing::debug;

use crate::error::AppResult;
use cashplan_core::analytics::{summarize, HistoryAnalytics};
use cashplan_db::Database;

pub async fn run(db: &Database) -> AppResult<HistoryAnalytics> {
    let records = db.calculations().list(None).await?;
    debug!(records = records.len(), "Summarizing history");
    Ok(summarize(&records))
}
