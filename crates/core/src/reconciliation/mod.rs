//! Title/discharge reconciliation.
//!
//! Joins a process's financial titles with their settlement (discharge)
//! events, decides which settlements were late, and prices the lost interest
//! on each one via the CDI service. Tolerant of partial data: one title's
//! discharge lookup failing never aborts the others.

pub mod model;
pub mod service;
pub mod source;

#[cfg(test)]
mod service_tests;

pub use model::{Discharge, DischargeBreakdown, EnrichedPayment, FinancialTitle, Reconciliation};
pub use service::ReconciliationService;
pub use source::TitleSource;
