//! Raw ERP rows and their normalization.
//!
//! The ERP mixes epoch-millis and ISO dates, leaks several spellings for the
//! same concept, and sometimes omits fields entirely. Each row type here
//! mirrors one ERP payload verbatim and knows how to normalize itself into
//! the canonical core type — the one canonical shape the engine sees.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use encargos_core::calculations::{ExpenseRecord, ProcessRecord};
use encargos_core::cdi::RateSample;
use encargos_core::installments::Installment;
use encargos_core::reconciliation::{Discharge, FinancialTitle};

/// Midnight-UTC epoch millis for a calendar day, the ERP's date filter
/// representation.
pub fn date_to_epoch_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// ERP dates arrive as epoch millis or as ISO strings depending on the
/// endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErpDate {
    Millis(i64),
    Text(String),
}

impl ErpDate {
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        match self {
            ErpDate::Millis(ms) => {
                DateTime::<Utc>::from_timestamp_millis(*ms).map(|dt| dt.date_naive())
            }
            ErpDate::Text(text) => {
                let head = text.get(..10).unwrap_or(text);
                NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
            }
        }
    }
}

fn optional_date(value: &Option<ErpDate>) -> Option<NaiveDate> {
    value.as_ref().and_then(ErpDate::to_naive_date)
}

// =============================================================================
// fin101 - CDI rates
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CdiRateRow {
    #[serde(rename = "ftxDtaTaxa")]
    pub rate_date: Option<ErpDate>,
    #[serde(rename = "ftxNumFatDiario")]
    pub daily_rate: Option<Decimal>,
}

impl CdiRateRow {
    /// Rows without a date or a numeric rate are dropped, not errors.
    pub fn normalize(&self) -> Option<RateSample> {
        let date = optional_date(&self.rate_date)?;
        let daily_rate = self.daily_rate?;
        Some(RateSample::new(date, daily_rate))
    }
}

// =============================================================================
// imp021 - process master data
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRow {
    #[serde(rename = "priCod", alias = "imcCod")]
    pub process_code: Option<i64>,
    #[serde(rename = "cliCod", alias = "dpeCodPessoa")]
    pub client_code: Option<serde_json::Value>,
    #[serde(rename = "vlrMneg", alias = "priMnyCifDolar")]
    pub fob_value: Option<Decimal>,
    #[serde(rename = "freteTotal")]
    pub freight_value: Option<Decimal>,
    #[serde(rename = "seguroTotal")]
    pub insurance_value: Option<Decimal>,
    #[serde(rename = "priFltTaxaConv")]
    pub fiscal_exchange_rate: Option<Decimal>,
}

impl ProcessRow {
    pub fn normalize(&self, fallback_process_id: &str) -> ProcessRecord {
        let process_code = self
            .process_code
            .or_else(|| fallback_process_id.parse().ok())
            .unwrap_or_default();

        // Client codes arrive as numbers or strings depending on the screen.
        let client_code = self.client_code.as_ref().map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        ProcessRecord {
            process_code,
            client_code,
            fob_value: self.fob_value.unwrap_or_default(),
            freight_value: self.freight_value.unwrap_or_default(),
            insurance_value: self.insurance_value.unwrap_or_default(),
            fiscal_exchange_rate: self.fiscal_exchange_rate.unwrap_or_default(),
        }
    }
}

// =============================================================================
// log009 - payment parcels
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ParcelRow {
    #[serde(rename = "pipCod")]
    pub parcel_code: Option<i64>,
    #[serde(rename = "pipDtaVcto", alias = "dtaVcto", alias = "data")]
    pub due_date: Option<ErpDate>,
    #[serde(rename = "pipMnyValor", alias = "valorUSD")]
    pub amount: Option<Decimal>,
    #[serde(rename = "pipNumDiasVcto", alias = "diasCorridos")]
    pub days_to_due: Option<i64>,
    #[serde(rename = "historico", alias = "descricao")]
    pub description: Option<String>,
}

impl ParcelRow {
    pub fn normalize(&self) -> Installment {
        Installment {
            principal: self.amount.unwrap_or_default(),
            scheduled_date: optional_date(&self.due_date)
                .unwrap_or_else(|| Utc::now().date_naive()),
            elapsed_days: self.days_to_due.unwrap_or(0),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| "Parcela".to_string()),
        }
    }
}

// =============================================================================
// imp021 - process expenses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseRow {
    #[serde(rename = "tipo", alias = "ctpDesNome")]
    pub expense_type: Option<String>,
    #[serde(rename = "descricao", alias = "impDesNome")]
    pub description: Option<String>,
    #[serde(rename = "valor", alias = "pidMnyValormn")]
    pub amount: Option<Decimal>,
}

impl ExpenseRow {
    pub fn normalize(&self) -> ExpenseRecord {
        ExpenseRecord {
            expense_type: self.expense_type.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
        }
    }
}

// =============================================================================
// psq015 - financial titles and discharges
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TitleRow {
    #[serde(rename = "filCod")]
    pub company_code: Option<i64>,
    #[serde(rename = "docCod")]
    pub document_code: Option<i64>,
    #[serde(rename = "titCod")]
    pub title_code: Option<i64>,
    #[serde(rename = "docTip")]
    pub document_type: Option<i64>,
    #[serde(rename = "titDtaVencimento")]
    pub due_date: Option<ErpDate>,
    #[serde(rename = "priCod", alias = "fPriCod")]
    pub process_code: Option<i64>,
}

impl TitleRow {
    /// Titles missing their code triple or due date cannot be reconciled
    /// and are dropped with a diagnostic upstream.
    pub fn normalize(&self, process_code: i64) -> Option<FinancialTitle> {
        Some(FinancialTitle {
            company_code: self.company_code?,
            document_code: self.document_code?,
            title_code: self.title_code?,
            document_type: self.document_type.unwrap_or(1),
            due_date: optional_date(&self.due_date)?,
            process_code: self.process_code.unwrap_or(process_code),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DischargeRow {
    #[serde(rename = "borDtaMvto")]
    pub movement_date: Option<ErpDate>,
    #[serde(rename = "bxaDtaBaixa")]
    pub settlement_date: Option<ErpDate>,
    #[serde(rename = "bxaMnyValor")]
    pub amount: Option<Decimal>,
}

impl DischargeRow {
    pub fn normalize(&self) -> Discharge {
        Discharge {
            movement_date: optional_date(&self.movement_date),
            settlement_date: optional_date(&self.settlement_date),
            amount: self.amount.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn epoch_millis_dates_normalize_to_calendar_days() {
        // 2025-01-15T00:00:00Z
        let row: CdiRateRow =
            serde_json::from_str(r#"{"ftxDtaTaxa": 1736899200000, "ftxNumFatDiario": 0.045}"#)
                .unwrap();
        let sample = row.normalize().unwrap();
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(sample.daily_rate, dec!(0.045));
    }

    #[test]
    fn rate_rows_without_a_rate_are_dropped() {
        let row: CdiRateRow = serde_json::from_str(r#"{"ftxDtaTaxa": 1736899200000}"#).unwrap();
        assert!(row.normalize().is_none());
    }

    #[test]
    fn parcel_description_falls_back_through_spellings() {
        let with_history: ParcelRow = serde_json::from_str(
            r#"{"pipMnyValor": 1000, "pipDtaVcto": "2025-06-15", "historico": "1a parcela"}"#,
        )
        .unwrap();
        assert_eq!(with_history.normalize().description, "1a parcela");

        let with_alias: ParcelRow = serde_json::from_str(
            r#"{"pipMnyValor": 1000, "pipDtaVcto": "2025-06-15", "descricao": "cambio"}"#,
        )
        .unwrap();
        assert_eq!(with_alias.normalize().description, "cambio");

        let bare: ParcelRow =
            serde_json::from_str(r#"{"pipMnyValor": 1000, "pipDtaVcto": "2025-06-15"}"#).unwrap();
        assert_eq!(bare.normalize().description, "Parcela");
    }

    #[test]
    fn absent_day_counts_default_to_zero() {
        let row: ParcelRow =
            serde_json::from_str(r#"{"pipMnyValor": 500, "pipDtaVcto": "2025-06-15"}"#).unwrap();
        assert_eq!(row.normalize().elapsed_days, 0);
    }

    #[test]
    fn iso_datetime_strings_truncate_to_the_day() {
        let row: DischargeRow = serde_json::from_str(
            r#"{"borDtaMvto": "2025-01-15T14:30:00.000Z", "bxaMnyValor": 10000}"#,
        )
        .unwrap();
        let discharge = row.normalize();
        assert_eq!(
            discharge.movement_date,
            Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
        );
        assert_eq!(discharge.amount, dec!(10000));
    }

    #[test]
    fn titles_without_their_code_triple_do_not_normalize() {
        let row: TitleRow =
            serde_json::from_str(r#"{"filCod": 2, "titDtaVencimento": "2025-01-10"}"#).unwrap();
        assert!(row.normalize(4711).is_none());
    }

    #[test]
    fn numeric_client_codes_become_strings() {
        let row: ProcessRow =
            serde_json::from_str(r#"{"priCod": 4711, "cliCod": 77, "vlrMneg": 40000}"#).unwrap();
        let record = row.normalize("4711");
        assert_eq!(record.client_code.as_deref(), Some("77"));
        assert_eq!(record.fob_value, dec!(40000));
    }
}
