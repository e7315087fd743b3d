//! Calculation storage trait.

use async_trait::async_trait;

use super::model::CalculationRecord;
use crate::errors::Result;

/// Append-only storage for calculation records.
///
/// The store never deduplicates: resubmitting identical input produces a
/// second record with the same `input_hash` and a fresh id. "One calculation
/// per process" is a caller policy, enforced (if desired) by checking
/// `latest_for_process` before calculating.
#[async_trait]
pub trait CalculationStore: Send + Sync {
    /// Inserts one record. Never updates an existing row.
    async fn save(&self, record: &CalculationRecord) -> Result<CalculationRecord>;

    /// Looks a record up by its id.
    fn get(&self, id: &str) -> Result<Option<CalculationRecord>>;

    /// The most recent record for a process, if any.
    fn latest_for_process(&self, process_id: &str) -> Result<Option<CalculationRecord>>;

    /// Records ordered most recent first, optionally filtered by process.
    fn list(&self, limit: i64, process_id: Option<&str>) -> Result<Vec<CalculationRecord>>;
}
