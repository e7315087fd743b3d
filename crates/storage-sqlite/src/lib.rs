//! SQLite storage implementation for the encargos engine.
//!
//! This crate provides all database-related functionality using Diesel with
//! SQLite. It implements the store traits defined in `encargos-core` and
//! contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The calculations repository
//! - Database-specific row types (with Diesel derives)
//!
//! This is the only place in the workspace where Diesel dependencies exist;
//! the other crates are database-agnostic and work with traits.

pub mod calculations;
pub mod db;
pub mod errors;
pub mod schema;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from encargos-core for convenience
pub use encargos_core::errors::{DatabaseError, Error, Result};
