//! Financial title and discharge models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A receivable/payable document due on a date.
///
/// The code triple (`company_code`, `document_code`, `title_code`) plus the
/// document type addresses the title's discharge records in the ERP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTitle {
    pub company_code: i64,
    pub document_code: i64,
    pub title_code: i64,
    pub document_type: i64,
    pub due_date: NaiveDate,
    pub process_code: i64,
}

/// A settlement event against a financial title. Partial and multiple
/// discharges per title are normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discharge {
    pub movement_date: Option<NaiveDate>,
    pub settlement_date: Option<NaiveDate>,
    pub amount: Decimal,
}

impl Discharge {
    /// Effective payment date: the bank movement date when present,
    /// otherwise the settlement date.
    pub fn payment_date(&self) -> Option<NaiveDate> {
        self.movement_date.or(self.settlement_date)
    }
}

/// One discharge annotated with its late-payment figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DischargeBreakdown {
    pub payment_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub lost_interest: Decimal,
    pub late_days: i64,
    pub accumulated_factor: Decimal,
}

/// A title joined with its annotated discharges.
///
/// `lost_interest` and `late_days` are sums over the discharges: multiple
/// partial late settlements each contribute their own delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPayment {
    pub title: FinancialTitle,
    pub discharges: Vec<DischargeBreakdown>,
    pub lost_interest: Decimal,
    pub late_days: i64,
}

/// Reconciliation output for one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub payments: Vec<EnrichedPayment>,
    pub total_lost_interest: Decimal,
}

impl Reconciliation {
    pub fn empty() -> Self {
        Self {
            payments: Vec::new(),
            total_lost_interest: Decimal::ZERO,
        }
    }
}
