//! Stage-aware calculation errors.

use std::fmt;

use thiserror::Error;

use crate::errors::Error;

/// Where in the orchestration pipeline a calculation failed.
///
/// Lets callers tell "no data" (fetch) apart from computation, validation
/// and persistence failures — a persistence failure, for instance, can be
/// retried without recomputing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationStage {
    Fetch,
    Movements,
    Reconcile,
    Validate,
    Persist,
}

impl fmt::Display for CalculationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculationStage::Fetch => "fetch",
            CalculationStage::Movements => "movements",
            CalculationStage::Reconcile => "reconcile",
            CalculationStage::Validate => "validate",
            CalculationStage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// A calculation failure carrying its pipeline stage and underlying cause.
#[derive(Error, Debug)]
#[error("Calculation failed at stage '{stage}': {source}")]
pub struct CalculationError {
    pub stage: CalculationStage,
    #[source]
    pub source: Box<Error>,
}

impl CalculationError {
    pub fn at(stage: CalculationStage, source: Error) -> Error {
        Error::Calculation(CalculationError {
            stage,
            source: Box::new(source),
        })
    }
}
