//! Core error types for the encargos engine.
//!
//! This module defines database-agnostic and transport-agnostic error types.
//! Storage-specific errors (Diesel, SQLite) and ERP transport errors (HTTP,
//! session) are converted into these types by the respective adapter crates.

use std::num::ParseFloatError;
use thiserror::Error;

use chrono::ParseError as ChronoParseError;

use crate::calculations::CalculationError;
use crate::cdi::CdiError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the encargos engine.
///
/// Storage and transport errors are carried in string form to keep this type
/// free of backend-specific dependencies.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("External source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("CDI rate operation failed: {0}")]
    Cdi(#[from] CdiError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// All details are `String`s so that the storage layer can convert
/// backend-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors raised by external data sources (the ERP adapter).
///
/// These are reported after the adapter's own refresh-and-retry-once policy
/// is exhausted; the engine itself never retries them.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source could not be reached or answered with a server error.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Authentication against the source failed even after a session refresh.
    #[error("Source authentication failed: {0}")]
    Auth(String),

    /// The source answered with a payload the adapter could not interpret.
    #[error("Unexpected source payload: {0}")]
    Payload(String),
}

/// Validation errors for user input and assembled results.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Result shape violation: {0}")]
    ShapeViolation(String),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
