//! Calculation input, result, and persisted record models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::STATUS_CALCULATED;
use crate::errors::{Result, ValidationError};
use crate::installments::{Installment, Movement};
use crate::reconciliation::EnrichedPayment;

/// Caller-supplied input for one calculation.
///
/// `payments` and `cdi_rate` are manual overrides: a non-empty payment list
/// replaces the fetched ERP parcels, and an explicit CDI rate wins over the
/// most recent fetched sample. The spot rate only ever comes from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    pub process_id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub emission_date: Option<NaiveDate>,
    #[serde(default)]
    pub payments: Vec<Installment>,
    #[serde(default)]
    pub cdi_rate: Option<Decimal>,
    #[serde(default)]
    pub spot_rate: Option<Decimal>,
}

/// Normalized process metadata from the ERP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub process_code: i64,
    pub client_code: Option<String>,
    pub fob_value: Decimal,
    pub freight_value: Decimal,
    pub insurance_value: Decimal,
    pub fiscal_exchange_rate: Decimal,
}

/// A process expense row from the ERP, used for the double-charge guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub expense_type: String,
    pub description: String,
    pub amount: Decimal,
}

/// Import cost block (process currency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostsUsd {
    pub fob: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub cif: Decimal,
}

/// Exchange figures applied to this calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeBlock {
    pub cdi_daily: Decimal,
    pub spot_rate: Decimal,
    pub forward_rate: Decimal,
    pub fiscal_dollar_rate: Decimal,
    pub cif_brl: Decimal,
}

/// Aggregated totals over movements and reconciled payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub disburse: Decimal,
    pub interest: Decimal,
    pub lost_interest: Decimal,
    pub charges: Decimal,
}

/// Fixed-shape summary block, present even for empty calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub calculated_at: DateTime<Utc>,
    pub total_disburse: Decimal,
    pub effective_rate: Decimal,
}

/// The assembled outcome of one orchestration call.
///
/// Constructed exclusively by the calculation service; sub-results
/// (movements, enriched payments) are owned by and nested inside it. The
/// `input_hash` keys the record for idempotence detection by consumers; the
/// id is always fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub id: String,
    pub input_hash: String,
    pub process_id: String,
    pub client_id: Option<String>,
    pub costs: CostsUsd,
    pub exchange: ExchangeBlock,
    pub expenses: Vec<ExpenseRecord>,
    pub movements: Vec<Movement>,
    pub enriched_payments: Vec<EnrichedPayment>,
    pub totals: Totals,
    pub has_existing_interest_charge: bool,
    pub summary: Summary,
    pub status: String,
}

impl CalculationResult {
    /// Shape check applied before the result is handed to persistence.
    ///
    /// The type system already pins the structure, so this verifies the
    /// cross-field invariants a schema cannot: per-movement totals, totals
    /// consistent with the movement list, summary agreeing with both.
    pub fn validate(&self) -> Result<()> {
        if self.process_id.trim().is_empty() {
            return Err(ValidationError::MissingField("processId".to_string()).into());
        }
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }

        for (index, movement) in self.movements.iter().enumerate() {
            if movement.total != movement.principal + movement.interest {
                return Err(ValidationError::ShapeViolation(format!(
                    "movement {} total {} != principal {} + interest {}",
                    index, movement.total, movement.principal, movement.interest
                ))
                .into());
            }
        }

        let disburse: Decimal = self.movements.iter().map(|m| m.principal).sum();
        let interest: Decimal = self.movements.iter().map(|m| m.interest).sum();
        if self.totals.disburse != disburse || self.totals.interest != interest {
            return Err(ValidationError::ShapeViolation(format!(
                "totals {}/{} disagree with movements {}/{}",
                self.totals.disburse, self.totals.interest, disburse, interest
            ))
            .into());
        }
        if self.totals.charges != self.totals.disburse + self.totals.interest {
            return Err(ValidationError::ShapeViolation(
                "charges must equal disburse + interest".to_string(),
            )
            .into());
        }

        if self.summary.count != self.movements.len() {
            return Err(ValidationError::ShapeViolation(format!(
                "summary count {} != {} movements",
                self.summary.count,
                self.movements.len()
            ))
            .into());
        }
        if self.summary.total_disburse != self.totals.disburse {
            return Err(ValidationError::ShapeViolation(
                "summary disburse disagrees with totals".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

/// One persisted calculation row.
///
/// The payload carries the full result as an opaque structured blob; the
/// flat columns exist for listing and lookup. Persisted as an insert, never
/// updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: String,
    pub process_id: String,
    pub client_id: Option<String>,
    pub input_hash: String,
    pub payload: CalculationResult,
    pub total_disburse: Decimal,
    pub total_charges: Decimal,
    pub calculated_at: DateTime<Utc>,
    pub status: String,
}

impl CalculationRecord {
    pub fn from_result(result: CalculationResult) -> Self {
        Self {
            id: result.id.clone(),
            process_id: result.process_id.clone(),
            client_id: result.client_id.clone(),
            input_hash: result.input_hash.clone(),
            total_disburse: result.totals.disburse,
            total_charges: result.totals.charges,
            calculated_at: result.summary.calculated_at,
            status: result.status.clone(),
            payload: result,
        }
    }
}

/// Generates the identifier for a fresh calculation.
pub fn new_calculation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Default status for new results.
pub fn default_status() -> String {
    STATUS_CALCULATED.to_string()
}
