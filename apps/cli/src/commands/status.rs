//! # Status Command
//!
//! `cashplan db-status`: connection, schema and migration state, plus row
//! counts when the schema is complete.

use serde::Serialize;
use std::path::PathBuf;

use crate::error::AppResult;
use cashplan_db::{Database, DbStatus};

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub database_path: PathBuf,
    pub healthy: bool,
    #[serde(flatten)]
    pub status: DbStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<RowCounts>,
}

#[derive(Debug, Serialize)]
pub struct RowCounts {
    pub denominations: usize,
    pub calculations: i64,
    pub templates: i64,
}

pub async fn run(db: &Database, database_path: PathBuf) -> AppResult<StatusView> {
    let status = db.status().await?;
    let healthy = status.is_healthy();

    let counts = if healthy {
        Some(RowCounts {
            denominations: db.denominations().list().await?.len(),
            calculations: db.calculations().count().await?,
            templates: db.templates().count().await?,
        })
    } else {
        None
    };

    Ok(StatusView {
        database_path,
        healthy,
        status,
        counts,
    })
}
