//! Process data source traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::{ExpenseRecord, ProcessRecord};
use crate::errors::Result;
use crate::installments::Installment;

/// Read access to a process's master data in the ERP.
///
/// Normalization happens behind this boundary: raw rows with alternate
/// field names, epoch-millis dates and absent day counts arrive here as
/// canonical records.
#[async_trait]
pub trait ProcessSource: Send + Sync {
    /// Process metadata (costs, client, fiscal exchange rate).
    async fn process(&self, process_id: &str) -> Result<ProcessRecord>;

    /// Scheduled payment parcels for the process.
    async fn installments(&self, process_id: &str) -> Result<Vec<Installment>>;

    /// Expense rows booked against the process.
    async fn expenses(&self, process_id: &str) -> Result<Vec<ExpenseRecord>>;
}

/// Write path for booking the financing-charge expense on a finalized
/// calculation.
#[async_trait]
pub trait ExpenseSink: Send + Sync {
    /// Books an "ENCARGOS FINANCEIROS" expense for the process. The amount
    /// is in the process currency; the sink converts to BRL with the given
    /// fiscal rate.
    async fn submit_expense(
        &self,
        process_id: &str,
        amount: Decimal,
        fiscal_rate: Decimal,
        emission_date: NaiveDate,
    ) -> Result<()>;
}
