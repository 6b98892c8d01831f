//! # Database State
//!
//! Resolves the database file and opens the pool for a command run.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::AppConfig;
use crate::error::{AppError, AppResult, ErrorCode};
use cashplan_db::{Database, DbConfig};

/// Determines the database file path.
///
/// ## Resolution
/// 1. `database.path` from the config (file or `CASHPLAN_DB_PATH`)
/// 2. `cashplan.db` in the platform data directory:
///    - **Linux**: `~/.local/share/cashplan/cashplan.db`
///    - **macOS**: `~/Library/Application Support/com.cashplan.cashplan/cashplan.db`
///    - **Windows**: `%APPDATA%\cashplan\cashplan\data\cashplan.db`
pub fn database_path(config: &AppConfig) -> AppResult<PathBuf> {
    if let Some(path) = &config.database.path {
        return Ok(path.clone());
    }

    let dirs = ProjectDirs::from("com", "cashplan", "cashplan").ok_or_else(|| {
        AppError::new(
            ErrorCode::ConfigError,
            "Could not determine app data directory; set database.path",
        )
    })?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| {
        AppError::new(
            ErrorCode::DatabaseError,
            format!("Cannot create {}: {}", data_dir.display(), e),
        )
    })?;

    Ok(data_dir.join("cashplan.db"))
}

/// Opens the database at `path` and applies pending migrations.
pub async fn open_database(path: &Path, config: &AppConfig) -> AppResult<Database> {
    info!(?path, "Opening database");

    let db_config = DbConfig::new(path).max_connections(config.database.max_connections);
    Ok(Database::new(db_config).await?)
}
