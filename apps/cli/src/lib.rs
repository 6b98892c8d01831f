//! # cashplan Command Line
//!
//! Splits salaries into banknotes, manages the note inventory, and keeps
//! a history of dispensed salaries.
//!
//! ## Module Organization
//! ```text
//! cashplan_cli/
//! ├── lib.rs          ◄─── You are here (arguments, startup, dispatch)
//! ├── state/
//! │   ├── mod.rs      ◄─── State exports
//! │   ├── config.rs   ◄─── AppConfig (defaults, TOML, environment)
//! │   └── db.rs       ◄─── Database path and connection
//! ├── commands/       ◄─── One module per subcommand
//! └── error.rs        ◄─── AppError for commands
//! ```
//!
//! ## Output
//! Results go to stdout as pretty JSON. Errors go to stderr as
//! `{"code": ..., "message": ...}` with a non-zero exit status. Logs go to
//! stderr.

pub mod commands;
pub mod error;
pub mod state;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cashplan_db::Database;

use commands::batch::BatchArgs;
use commands::calculate::CalculateArgs;
use commands::history::HistoryArgs;
use commands::inventory::InventoryArgs;
use commands::templates::TemplatesArgs;
use error::AppResult;
use state::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "cashplan", version)]
#[command(about = "Salary banknote breakdown planner")]
pub struct Cli {
    /// Config file. Default: cashplan.toml in the platform config directory.
    #[arg(long, global = true, env = "CASHPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file. Overrides the config.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split one salary into notes.
    Calculate(CalculateArgs),
    /// Split a list of salaries.
    Batch(BatchArgs),
    /// Note stock.
    Inventory(InventoryArgs),
    /// Saved calculations.
    History(HistoryArgs),
    /// Salary templates.
    Templates(TemplatesArgs),
    /// Aggregates over the history.
    Analytics,
    /// Connection, schema and migration status.
    DbStatus,
}

/// Runs the command line application.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging   tracing-subscriber, RUST_LOG or default        │
/// │  2. Parse Arguments      clap                                           │
/// │  3. Load Configuration   defaults → cashplan.toml → CASHPLAN_*          │
/// │  4. Connect to Database  WAL mode, pending migrations                   │
/// │  5. Dispatch             print JSON result or coded error               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = ?err.code, "{}", err.message);
            match serde_json::to_string_pretty(&err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::from(err.code.exit_code())
        }
    }
}

/// Loads configuration, opens the database and runs one command.
pub async fn execute(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.db {
        config.database.path = Some(path);
    }

    let path = state::database_path(&config)?;
    let db = state::open_database(&path, &config).await?;
    info!("Database connected and migrations applied");

    let result = dispatch(&db, &config, path, cli.command).await;
    db.close().await;
    result
}

async fn dispatch(
    db: &Database,
    config: &AppConfig,
    database_path: PathBuf,
    command: Command,
) -> AppResult<()> {
    match command {
        Command::Calculate(args) => emit(&commands::calculate::run(db, config, args).await?),
        Command::Batch(args) => emit(&commands::batch::run(db, config, args).await?),
        Command::Inventory(args) => emit(&commands::inventory::run(db, config, args).await?),
        Command::History(args) => emit(&commands::history::run(db, args).await?),
        Command::Templates(args) => emit(&commands::templates::run(db, args).await?),
        Command::Analytics => emit(&commands::analytics::run(db).await?),
        Command::DbStatus => emit(&commands::status::run(db, database_path).await?),
    }
}

fn emit<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cashplan_db=trace` - Trace the store only
/// - Default: `info,cashplan=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cashplan=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
