//! Core source-trait implementations for the ERP client.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use encargos_core::calculations::{ExpenseRecord, ExpenseSink, ProcessRecord, ProcessSource};
use encargos_core::cdi::{RateSample, RateSource};
use encargos_core::errors::Result;
use encargos_core::installments::Installment;
use encargos_core::reconciliation::{Discharge, FinancialTitle, TitleSource};

use crate::client::ErpClient;

#[async_trait]
impl RateSource for ErpClient {
    async fn rates_in_window(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RateSample>> {
        let rows = self.cdi_rates(Some((start, end))).await?;
        Ok(rows.iter().filter_map(|row| row.normalize()).collect())
    }

    async fn latest_rates(&self) -> Result<Vec<RateSample>> {
        let rows = self.cdi_rates(None).await?;
        Ok(rows.iter().filter_map(|row| row.normalize()).collect())
    }
}

#[async_trait]
impl ProcessSource for ErpClient {
    async fn process(&self, process_id: &str) -> Result<ProcessRecord> {
        let row = self.process_by_id(process_id).await?;
        Ok(row.normalize(process_id))
    }

    async fn installments(&self, process_id: &str) -> Result<Vec<Installment>> {
        let rows = self.parcels(process_id).await?;
        Ok(rows.iter().map(|row| row.normalize()).collect())
    }

    async fn expenses(&self, process_id: &str) -> Result<Vec<ExpenseRecord>> {
        let rows = self.process_expenses(process_id).await?;
        Ok(rows.iter().map(|row| row.normalize()).collect())
    }
}

#[async_trait]
impl TitleSource for ErpClient {
    async fn financial_titles(&self, process_code: i64) -> Result<Vec<FinancialTitle>> {
        let rows = self.financial_titles(process_code).await?;
        let mut titles = Vec::with_capacity(rows.len());
        for row in &rows {
            match row.normalize(process_code) {
                Some(title) => titles.push(title),
                None => log::warn!(
                    "dropping unaddressable title row for process {}",
                    process_code
                ),
            }
        }
        Ok(titles)
    }

    async fn discharges(&self, title: &FinancialTitle) -> Result<Vec<Discharge>> {
        let rows = self
            .title_discharges(
                title.company_code,
                title.document_type,
                title.document_code,
                title.title_code,
            )
            .await?;
        Ok(rows.iter().map(|row| row.normalize()).collect())
    }
}

#[async_trait]
impl ExpenseSink for ErpClient {
    async fn submit_expense(
        &self,
        process_id: &str,
        amount: Decimal,
        fiscal_rate: Decimal,
        emission_date: NaiveDate,
    ) -> Result<()> {
        ErpClient::submit_expense(self, process_id, amount, fiscal_rate, emission_date).await?;
        Ok(())
    }
}
