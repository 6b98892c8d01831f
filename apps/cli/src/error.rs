//! # Command Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in cashplan                               │
//! │                                                                         │
//! │  Command Function  ─►  Result<T, AppError>                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Database Error?   ─── DbError::NotFound {..} ────────┐                 │
//! │         │                                             │                 │
//! │         ▼                                             ▼                 │
//! │  Domain Error?     ─── CoreError::InvalidAmount ── AppError ──► stderr  │
//! │         │                                             ▲    (JSON) and   │
//! │         ▼                                             │    exit code    │
//! │  Config Error?     ─── ConfigError::Parse ────────────┘                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Success ─────────────────────────────────────────────────► stdout      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed breakdown is not an error: it is printed on stdout as a
//! `"status": "failure"` result.

use serde::Serialize;

use crate::state::ConfigError;
use cashplan_core::CoreError;
use cashplan_db::DbError;

/// Error printed when a command fails.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Calculation not found: 4f0c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Stock changed under a dispense, or a batch would overdraw it
    InventoryConflict,

    DatabaseError,

    /// Configuration file or environment is invalid
    ConfigError,

    /// A file given on the command line could not be read or parsed
    InputError,

    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::ValidationError | ErrorCode::InputError => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::InventoryConflict => 4,
            ErrorCode::ConfigError => 5,
            ErrorCode::DatabaseError | ErrorCode::Internal => 1,
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn input(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::InputError, message)
    }
}

/// Result type for commands.
pub type AppResult<T> = Result<T, AppError>;

/// Converts database errors to command errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => AppError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::ConstraintViolation(msg) => {
                tracing::error!("Constraint violation: {}", msg);
                AppError::validation("Value rejected by the database")
            }
            err @ (DbError::InventoryConflict { .. } | DbError::InventoryOverdrawn { .. }) => {
                AppError::new(ErrorCode::InventoryConflict, err.to_string())
            }
            DbError::Domain(core) => AppError::from(core),
            DbError::Serialization(e) => {
                tracing::error!("Stored breakdown could not be decoded: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Stored data is corrupt")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to command errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientNotes { .. } => {
                AppError::new(ErrorCode::InventoryConflict, err.to_string())
            }
            other => AppError::validation(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::new(ErrorCode::Internal, format!("JSON encoding failed: {}", err))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
