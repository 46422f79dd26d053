//! # Database Error Types
//!
//! Storage errors, and the error every ledger/workflow operation returns.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← constraint / busy / pool categorization                     │
//! │       │                                                                 │
//! │       │        CoreError (stockwise-core)                              │
//! │       │             │                                                   │
//! │       ▼             ▼                                                   │
//! │  LedgerError { Persistence | Domain }                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorReport { code: "INSUFFICIENT_STOCK", message: "..." }            │
//! │  (serialized by the HTTP layer)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use stockwise_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These wrap sqlx errors and add enough categorization for the retry loops
/// (unique violations) and for callers (busy vs. broken).
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two receipts numbered in the same instant (`grns.grn_number`)
    /// - Generated SKU collision (`items.sku`)
    /// - Explicit duplicate SKU or barcode
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (e.g. negative stock).
    #[error("Check constraint failed: {message}")]
    CheckViolation { message: String },

    /// The database stayed locked past the busy timeout. The transaction
    /// was rolled back.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// Identifier generation kept colliding.
    #[error("Could not allocate a unique {sequence} after {attempts} attempts")]
    SequenceExhausted { sequence: String, attempts: u32 },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when this is a unique violation on `table.column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field.split(", ").any(|f| f == column))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → constraint type from the SQLite message,
///                               SQLITE_BUSY → DbError::Busy
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                // "database is locked" (SQLITE_BUSY, code 5 / 517)
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked")
                    || matches!(db_err.code().as_deref(), Some("5") | Some("517"))
                {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Ledger Error
// =============================================================================

/// What every ledger, cart and receipt operation returns.
///
/// `Domain` errors are expected outcomes the caller can act on.
/// `Persistence` errors mean the transaction was rolled back and nothing
/// was written.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Persistence(err.into())
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Domain(err.into())
    }
}

impl LedgerError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        LedgerError::Domain(CoreError::not_found(entity, id))
    }

    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::Domain(err) => match err {
                CoreError::Validation(_) | CoreError::ItemDisabled { .. } => ErrorCode::ValidationError,
                CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
                CoreError::NotFound { .. } => ErrorCode::NotFound,
                CoreError::AlreadyFinalized { .. } => ErrorCode::AlreadyFinalized,
                CoreError::InvalidOrderTransition { .. } => ErrorCode::InvalidTransition,
            },
            LedgerError::Persistence(DbError::NotFound { .. }) => ErrorCode::NotFound,
            LedgerError::Persistence(_) => ErrorCode::PersistenceFailure,
        }
    }

    /// Code plus message, ready to serialize.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Error codes for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input or quantity policy violation (400)
    ValidationError,

    /// Requested more than is on hand (409)
    InsufficientStock,

    /// Resource not found (404)
    NotFound,

    /// Receipt already approved or rejected (409)
    AlreadyFinalized,

    /// Order status change not allowed (422)
    InvalidTransition,

    /// Storage failure, nothing was written (500)
    PersistenceFailure,
}

/// Serializable error for the HTTP layer.
///
/// ```json
/// { "code": "ALREADY_FINALIZED", "message": "Goods receipt GRN-261018-001 was already approved by someone else" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

/// Result type for ledger and workflow operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================
