//! Title lookup trait.

use async_trait::async_trait;

use super::model::{Discharge, FinancialTitle};
use crate::errors::Result;

/// Read access to a process's financial titles and their discharges.
#[async_trait]
pub trait TitleSource: Send + Sync {
    /// Open financial titles attached to a process.
    async fn financial_titles(&self, process_code: i64) -> Result<Vec<FinancialTitle>>;

    /// Discharge events for one title.
    ///
    /// The adapter normalizes the ERP's single-object responses into a list
    /// of size 0 or 1, and maps "no discharge data" statuses to an empty
    /// list rather than an error.
    async fn discharges(&self, title: &FinancialTitle) -> Result<Vec<Discharge>>;
}
