//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CASHPLAN_DB_PATH=/srv/cashplan.db                                  │
//! │     CASHPLAN_BATCH_MODE=snapshot                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or cashplan.toml in the platform config dir       │
//! │     ~/.config/cashplan/cashplan.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     IQD, greedy, running batches, alerts at 20 / 10 notes              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/cashplan/cashplan.db"
//! max_connections = 5
//!
//! [currency]
//! code = "IQD"
//!
//! [calculation]
//! strategy = "greedy"      # greedy | optimal
//! default_inventory = 100  # count used by `inventory reset`
//!
//! [batch]
//! mode = "running"         # unlimited | snapshot | running
//! save_to_history = false
//!
//! [alerts]
//! low = 20
//! critical = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use cashplan_core::batch::InventoryMode;
use cashplan_core::validation::{validate_inventory_count, validate_thresholds};
use cashplan_core::{
    AlertThresholds, Strategy, ValidationError, DEFAULT_CRITICAL_STOCK_THRESHOLD,
    DEFAULT_CURRENCY_CODE, DEFAULT_INVENTORY_COUNT, DEFAULT_LOW_STOCK_THRESHOLD,
};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "cashplan.toml";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. `None` uses the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// Code shown in amounts and failure reasons.
    #[serde(default = "default_currency_code")]
    pub code: String,
}

fn default_currency_code() -> String {
    DEFAULT_CURRENCY_CODE.to_string()
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency_code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSettings {
    #[serde(default)]
    pub strategy: Strategy,

    /// Count every denomination returns to on `inventory reset`.
    #[serde(default = "default_inventory")]
    pub default_inventory: i64,
}

fn default_inventory() -> i64 {
    DEFAULT_INVENTORY_COUNT
}

impl Default for CalculationSettings {
    fn default() -> Self {
        CalculationSettings {
            strategy: Strategy::default(),
            default_inventory: default_inventory(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default)]
    pub mode: InventoryMode,

    #[serde(default)]
    pub save_to_history: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_low")]
    pub low: i64,

    #[serde(default = "default_critical")]
    pub critical: i64,
}

fn default_low() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_critical() -> i64 {
    DEFAULT_CRITICAL_STOCK_THRESHOLD
}

impl Default for AlertSettings {
    fn default() -> Self {
        AlertSettings {
            low: default_low(),
            critical: default_critical(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete application configuration. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub calculation: CalculationSettings,

    #[serde(default)]
    pub batch: BatchSettings,

    #[serde(default)]
    pub alerts: AlertSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path`, else `cashplan.toml` in the platform
    ///    config directory. An explicit path must exist.
    /// 3. `CASHPLAN_*` environment variables
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file. Missing sections and keys take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let code = self.currency.code.trim();
        if code.is_empty() {
            return Err(ValidationError::Required {
                field: "currency.code".to_string(),
            }
            .into());
        }
        if code.len() > 10 {
            return Err(ValidationError::TooLong {
                field: "currency.code".to_string(),
                max: 10,
            }
            .into());
        }

        if self.database.max_connections == 0 {
            return Err(ValidationError::MustBePositive {
                field: "database.max_connections".to_string(),
            }
            .into());
        }

        validate_inventory_count(self.calculation.default_inventory)?;
        validate_thresholds(self.alerts.low, self.alerts.critical)?;
        Ok(())
    }

    /// Applies `CASHPLAN_*` overrides read through `var`.
    ///
    /// | variable                      | field                          |
    /// |-------------------------------|--------------------------------|
    /// | `CASHPLAN_DB_PATH`            | `database.path`                |
    /// | `CASHPLAN_MAX_CONNECTIONS`    | `database.max_connections`     |
    /// | `CASHPLAN_CURRENCY`           | `currency.code`                |
    /// | `CASHPLAN_STRATEGY`           | `calculation.strategy`         |
    /// | `CASHPLAN_DEFAULT_INVENTORY`  | `calculation.default_inventory`|
    /// | `CASHPLAN_BATCH_MODE`         | `batch.mode`                   |
    /// | `CASHPLAN_SAVE_BATCH_HISTORY` | `batch.save_to_history`        |
    /// | `CASHPLAN_LOW_STOCK`          | `alerts.low`                   |
    /// | `CASHPLAN_CRITICAL_STOCK`     | `alerts.critical`              |
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("CASHPLAN_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        override_parsed(&var, "CASHPLAN_MAX_CONNECTIONS", &mut self.database.max_connections);

        if let Some(code) = var("CASHPLAN_CURRENCY") {
            self.currency.code = code.trim().to_uppercase();
        }

        override_parsed(&var, "CASHPLAN_STRATEGY", &mut self.calculation.strategy);
        override_parsed(
            &var,
            "CASHPLAN_DEFAULT_INVENTORY",
            &mut self.calculation.default_inventory,
        );
        override_parsed(&var, "CASHPLAN_BATCH_MODE", &mut self.batch.mode);
        override_parsed(
            &var,
            "CASHPLAN_SAVE_BATCH_HISTORY",
            &mut self.batch.save_to_history,
        );
        override_parsed(&var, "CASHPLAN_LOW_STOCK", &mut self.alerts.low);
        override_parsed(&var, "CASHPLAN_CRITICAL_STOCK", &mut self.alerts.critical);
    }

    /// `cashplan.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cashplan", "cashplan")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            low: self.alerts.low,
            critical: self.alerts.critical,
        }
    }

    pub fn currency_code(&self) -> &str {
        self.currency.code.trim()
    }
}

fn override_parsed<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = var(key) {
        match raw.trim().parse() {
            Ok(value) => {
                debug!(key, value = %raw, "Overriding config from environment");
                *target = value;
            }
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable environment override"),
        }
    }
}
