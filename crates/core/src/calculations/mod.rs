//! Calculation orchestration.
//!
//! The top-level entry point of the engine: fetches process data from the
//! ERP sources, resolves manual-versus-fetched rates, prices the scheduled
//! installments, reconciles late payments, assembles and validates the
//! result, and persists it append-only with a content hash of the input.

pub mod errors;
pub mod model;
pub mod service;
pub mod source;
pub mod store;


pub use errors::{CalculationError, CalculationStage};
pub use model::{
    CalculationInput, CalculationRecord, CalculationResult, CostsUsd, ExchangeBlock,
    ExpenseRecord, ProcessRecord, Summary, Totals,
};
pub use service::{CalculationService, CalculationServiceTrait};
pub use source::{ExpenseSink, ProcessSource};
pub use store::CalculationStore;
