//! # State Module
//!
//! What every command receives: the loaded configuration and an open
//! database.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────────┐  │
//! │  │     AppConfig        │        │            Database              │  │
//! │  │                      │        │                                  │  │
//! │  │  currency, strategy  │        │  SqlitePool + dispense_lock      │  │
//! │  │  batch mode, alerts  │        │  (cashplan-db)                   │  │
//! │  └──────────────────────┘        └──────────────────────────────────┘  │
//! │                                                                         │
//! │  AppConfig is read-only after loading. Database is cheap to clone and  │
//! │  safe to share; dispensing serializes on its internal lock.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::{AppConfig, ConfigError, ConfigResult, CONFIG_FILE_NAME};
pub use db::{database_path, open_database};
