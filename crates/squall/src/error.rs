//! Error types for squall

use thiserror::Error;

/// Result type alias for squall operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while building statements or running transactions.
///
/// Construction-time variants are returned immediately by constructors.
/// Driver variants carry the backend's native error unchanged.
#[derive(Debug, Error)]
pub enum SqlError {
    /// Unrecognized statement command tag
    #[error("Invalid SQL command: {0}")]
    InvalidSqlCommand(String),

    /// Malformed literal, or field/value count mismatch
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Malformed field list or distinct subset
    #[error("Invalid field format: {0}")]
    InvalidFieldFormat(String),

    /// Disallowed value in a WHERE/HAVING clause
    #[error("Invalid where clause: {0}")]
    InvalidWhereClause(String),

    /// Malformed condition (operator, placement, sort order)
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Object queued in a transaction is not a runnable statement
    #[error("Invalid squall object: {0}")]
    InvalidSquallObject(String),

    /// `run()` or `pretend()` called with nothing queued
    #[error("Transaction has no statements to run")]
    EmptyTransaction,

    /// Connection attempted without a database name
    #[error("Missing database name: {0}")]
    MissingDatabaseName(String),

    /// No adapter registered (or configured) for the requested backend
    #[error("Missing adapter: {0}")]
    MissingAdapter(String),

    /// A rollback was performed
    #[error("Rollback signaled: {0}")]
    RollbackSignaled(String),

    /// A commit succeeded and the caller asked to be signaled
    #[error("Commit succeeded")]
    CommitSucceeded,

    /// Adapter used before `connect()` or after `disconnect()`
    #[error("Adapter '{0}' is not connected")]
    NotConnected(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The connection could not be set up outside the driver itself
    #[error("Connection error: {0}")]
    Connection(String),

    /// A fetched column could not be converted into a [`Datum`](crate::Datum)
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Native SQLite driver error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Native PostgreSQL driver error
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Native ODBC driver error
    #[cfg(feature = "sqlserver")]
    #[error("ODBC error: {0}")]
    Odbc(#[from] odbc_api::Error),
}

impl SqlError {
    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Create an invalid condition error
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Self::InvalidCondition(message.into())
    }

    /// Create an invalid field format error
    pub fn invalid_field_format(message: impl Into<String>) -> Self {
        Self::InvalidFieldFormat(message.into())
    }

    /// Create a rollback signal with the given message
    pub fn rollback(message: impl Into<String>) -> Self {
        Self::RollbackSignaled(message.into())
    }

    /// Create a decode error for a fetched column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a rollback signal
    pub fn is_rollback(&self) -> bool {
        matches!(self, Self::RollbackSignaled(_))
    }

    /// Check if this error came straight from a database driver
    pub fn is_driver_error(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => true,
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => true,
            #[cfg(feature = "sqlserver")]
            Self::Odbc(_) => true,
            _ => false,
        }
    }

    /// Check if the driver reported an integrity/constraint violation
    ///
    /// SQLite: `SQLITE_CONSTRAINT`. PostgreSQL: SQLSTATE class `23`.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(err) => matches!(
                err.sqlite_error_code(),
                Some(rusqlite::ErrorCode::ConstraintViolation)
            ),
            #[cfg(feature = "postgres")]
            Self::Postgres(err) => err
                .as_db_error()
                .is_some_and(|db| db.code().code().starts_with("23")),
            _ => false,
        }
    }
}
