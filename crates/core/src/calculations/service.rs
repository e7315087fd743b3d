//! Calculation orchestration service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use super::errors::{CalculationError, CalculationStage};
use super::model::{
    default_status, new_calculation_id, CalculationInput, CalculationRecord, CalculationResult,
    CostsUsd, ExchangeBlock, ExpenseRecord, Summary, Totals,
};
use super::source::{ExpenseSink, ProcessSource};
use super::store::CalculationStore;
use crate::cdi::{RateSample, RateSource};
use crate::constants::FINANCE_CHARGE_MARKER;
use crate::errors::{DatabaseError, Result};
use crate::installments::{Installment, InstallmentService, Movement};
use crate::reconciliation::ReconciliationService;
use crate::utils::hash::content_hash;

#[async_trait]
pub trait CalculationServiceTrait: Send + Sync {
    /// Runs one full calculation and persists the result.
    async fn calculate(&self, input: CalculationInput) -> Result<CalculationResult>;

    /// Record by id, falling back to the most recent record for the process
    /// when the id is not a record id.
    fn get_calculation(&self, id: &str) -> Result<Option<CalculationRecord>>;

    /// Calculation history, most recent first.
    fn list_calculations(
        &self,
        limit: i64,
        process_id: Option<&str>,
    ) -> Result<Vec<CalculationRecord>>;

    /// Books the financing-charge expense for a stored calculation on the
    /// ERP write path.
    async fn submit_charges(
        &self,
        id: &str,
        emission_date: NaiveDate,
    ) -> Result<CalculationRecord>;
}

pub struct CalculationService {
    processes: Arc<dyn ProcessSource>,
    rates: Arc<dyn RateSource>,
    reconciliation: ReconciliationService,
    store: Arc<dyn CalculationStore>,
    expense_sink: Arc<dyn ExpenseSink>,
}

impl CalculationService {
    pub fn new(
        processes: Arc<dyn ProcessSource>,
        rates: Arc<dyn RateSource>,
        reconciliation: ReconciliationService,
        store: Arc<dyn CalculationStore>,
        expense_sink: Arc<dyn ExpenseSink>,
    ) -> Self {
        Self {
            processes,
            rates,
            reconciliation,
            store,
            expense_sink,
        }
    }

    /// The daily CDI rate for movement pricing: an explicit caller override
    /// wins over the most recent fetched sample; neither present means zero.
    fn resolve_daily_rate(input: &CalculationInput, latest: &[RateSample]) -> Decimal {
        input
            .cdi_rate
            .or_else(|| latest.first().map(|sample| sample.daily_rate))
            .unwrap_or(Decimal::ZERO)
    }

    /// A non-empty caller payment list overrides the fetched parcels.
    fn resolve_installments(
        input: &CalculationInput,
        fetched: Vec<Installment>,
    ) -> Vec<Installment> {
        if input.payments.is_empty() {
            fetched
        } else {
            input.payments.clone()
        }
    }

    fn has_existing_interest_charge(expenses: &[ExpenseRecord]) -> bool {
        expenses.iter().any(|expense| {
            expense
                .description
                .to_uppercase()
                .contains(FINANCE_CHARGE_MARKER)
                || expense
                    .expense_type
                    .to_uppercase()
                    .contains(FINANCE_CHARGE_MARKER)
        })
    }

    fn aggregate_totals(movements: &[Movement], lost_interest: Decimal) -> Totals {
        let disburse: Decimal = movements.iter().map(|m| m.principal).sum();
        let interest: Decimal = movements.iter().map(|m| m.interest).sum();
        Totals {
            disburse,
            interest,
            lost_interest,
            charges: disburse + interest,
        }
    }
}

#[async_trait]
impl CalculationServiceTrait for CalculationService {
    async fn calculate(&self, input: CalculationInput) -> Result<CalculationResult> {
        let input_hash = content_hash(&input)?;
        log::debug!(
            "calculating process {} (input hash {})",
            input.process_id,
            &input_hash[..12]
        );

        // Fetch: four independent reads, issued concurrently. Any failure is
        // fatal for this calculation; nothing partial is ever persisted.
        let (process, latest_rates, parcels, expenses) = tokio::join!(
            self.processes.process(&input.process_id),
            self.rates.latest_rates(),
            self.processes.installments(&input.process_id),
            self.processes.expenses(&input.process_id),
        );
        let process = process.map_err(|e| CalculationError::at(CalculationStage::Fetch, e))?;
        let latest_rates =
            latest_rates.map_err(|e| CalculationError::at(CalculationStage::Fetch, e))?;
        let parcels = parcels.map_err(|e| CalculationError::at(CalculationStage::Fetch, e))?;
        let expenses = expenses.map_err(|e| CalculationError::at(CalculationStage::Fetch, e))?;

        // Normalize
        let cdi_daily = Self::resolve_daily_rate(&input, &latest_rates);
        let spot_rate = input.spot_rate.unwrap_or(Decimal::ZERO);
        let installments = Self::resolve_installments(&input, parcels);

        // Movements: straight-line financing interest on the schedule.
        let movements = InstallmentService::compute_movements(&installments, cdi_daily, spot_rate);

        // Reconcile: always against true market rates; the manual override
        // never reaches this path.
        let reconciliation = self
            .reconciliation
            .reconcile(process.process_code)
            .await
            .map_err(|e| CalculationError::at(CalculationStage::Reconcile, e))?;

        // Aggregate
        let totals = Self::aggregate_totals(&movements, reconciliation.total_lost_interest);
        let has_existing_interest_charge = Self::has_existing_interest_charge(&expenses);
        let cif = process.fob_value + process.freight_value + process.insurance_value;
        let summary = Summary {
            count: movements.len(),
            calculated_at: Utc::now(),
            total_disburse: totals.disburse,
            effective_rate: cdi_daily,
        };

        let result = CalculationResult {
            id: new_calculation_id(),
            input_hash,
            process_id: input.process_id.clone(),
            client_id: input.client_id.clone().or(process.client_code.clone()),
            costs: CostsUsd {
                fob: process.fob_value,
                freight: process.freight_value,
                insurance: process.insurance_value,
                cif,
            },
            exchange: ExchangeBlock {
                cdi_daily,
                spot_rate,
                forward_rate: Decimal::ZERO,
                fiscal_dollar_rate: process.fiscal_exchange_rate,
                cif_brl: cif * process.fiscal_exchange_rate,
            },
            expenses,
            movements,
            enriched_payments: reconciliation.payments,
            totals,
            has_existing_interest_charge,
            summary,
            status: default_status(),
        };

        // Validate before committing anything to storage.
        result
            .validate()
            .map_err(|e| CalculationError::at(CalculationStage::Validate, e))?;

        let record = CalculationRecord::from_result(result);
        let saved = self
            .store
            .save(&record)
            .await
            .map_err(|e| CalculationError::at(CalculationStage::Persist, e))?;

        log::info!(
            "calculation {} persisted for process {} (charges {})",
            saved.id,
            saved.process_id,
            saved.total_charges
        );
        Ok(saved.payload)
    }

    fn get_calculation(&self, id: &str) -> Result<Option<CalculationRecord>> {
        if let Some(record) = self.store.get(id)? {
            return Ok(Some(record));
        }
        // Not a record id: treat it as a process reference.
        self.store.latest_for_process(id)
    }

    fn list_calculations(
        &self,
        limit: i64,
        process_id: Option<&str>,
    ) -> Result<Vec<CalculationRecord>> {
        self.store.list(limit, process_id)
    }

    async fn submit_charges(
        &self,
        id: &str,
        emission_date: NaiveDate,
    ) -> Result<CalculationRecord> {
        let record = self.get_calculation(id)?.ok_or_else(|| {
            crate::errors::Error::Database(DatabaseError::NotFound(format!(
                "no calculation found for '{}'",
                id
            )))
        })?;

        if record.payload.has_existing_interest_charge {
            log::warn!(
                "process {} already carries a financing charge, submitting anyway per caller request",
                record.process_id
            );
        }

        self.expense_sink
            .submit_expense(
                &record.process_id,
                record.payload.totals.interest,
                record.payload.exchange.fiscal_dollar_rate,
                emission_date,
            )
            .await?;

        log::info!(
            "financing charge submitted for process {} (calculation {})",
            record.process_id,
            record.id
        );
        Ok(record)
    }
}
