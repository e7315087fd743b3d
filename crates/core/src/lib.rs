//! Encargos Core - Domain entities, services, and traits.
//!
//! This crate contains the calculation engine for import-process financial
//! charges. It is database-agnostic and transport-agnostic: the ERP adapter
//! (`encargos-erp`) implements the source traits and the storage crate
//! (`encargos-storage-sqlite`) implements the store traits defined here.

pub mod calculations;
pub mod cdi;
pub mod constants;
pub mod errors;
pub mod installments;
pub mod reconciliation;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
