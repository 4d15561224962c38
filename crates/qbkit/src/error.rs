//! Error types for qbkit

use thiserror::Error;

/// Result type alias for qbkit operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum QbError {
    /// Invalid builder configuration (join type, row limit, execution time hint)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No table was set before rendering
    #[error("Table name is required for {0}")]
    MissingTable(&'static str),

    /// UPDATE rendered without any WHERE condition
    #[error("UPDATE requires at least one condition")]
    MissingCondition,

    /// UPDATE rendered without any SET item
    #[error("UPDATE requires at least one SET item")]
    EmptySet,

    /// INSERT rendered without any row
    #[error("INSERT requires at least one row")]
    EmptyInsert,

    /// Builder state recorded an error that is reported at render time
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure returned by a caller-supplied flush callback
    #[error("Flush callback failed: {0}")]
    Callback(Box<dyn std::error::Error + Send + Sync>),

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl QbError {
    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap an arbitrary error raised inside a flush callback
    pub fn callback(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Callback(err.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is an invalid configuration error
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }

    /// Check if this is the UPDATE-without-WHERE guard
    pub fn is_missing_condition(&self) -> bool {
        matches!(self, Self::MissingCondition)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Parse a tokio_postgres error into a more specific QbError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

impl From<toml::de::Error> for QbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
