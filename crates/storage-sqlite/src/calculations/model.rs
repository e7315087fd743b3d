//! Database row type for calculations.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::errors::StorageError;
use encargos_core::calculations::CalculationRecord;
use encargos_core::errors::Error;

/// One row of the append-only calculation log.
///
/// Decimals and timestamps are stored as text; `calculated_at` uses RFC 3339
/// UTC with fixed sub-second width so the lexicographic index order is the
/// chronological one.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::calculations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CalculationRow {
    pub id: String,
    pub process_id: String,
    pub client_id: Option<String>,
    pub input_hash: String,
    pub payload: String,
    pub total_disburse: String,
    pub total_charges: String,
    pub calculated_at: String,
    pub status: String,
}

impl TryFrom<&CalculationRecord> for CalculationRow {
    type Error = Error;

    fn try_from(record: &CalculationRecord) -> Result<Self, Error> {
        let payload = serde_json::to_string(&record.payload)
            .map_err(|e| Error::from(StorageError::SerializationError(e.to_string())))?;

        Ok(Self {
            id: record.id.clone(),
            process_id: record.process_id.clone(),
            client_id: record.client_id.clone(),
            input_hash: record.input_hash.clone(),
            payload,
            total_disburse: record.total_disburse.to_string(),
            total_charges: record.total_charges.to_string(),
            calculated_at: record
                .calculated_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            status: record.status.clone(),
        })
    }
}

impl TryFrom<CalculationRow> for CalculationRecord {
    type Error = Error;

    fn try_from(row: CalculationRow) -> Result<Self, Error> {
        let payload = serde_json::from_str(&row.payload)
            .map_err(|e| Error::from(StorageError::SerializationError(e.to_string())))?;

        Ok(Self {
            id: row.id,
            process_id: row.process_id,
            client_id: row.client_id,
            input_hash: row.input_hash,
            payload,
            total_disburse: parse_decimal(&row.total_disburse)?,
            total_charges: parse_decimal(&row.total_charges)?,
            calculated_at: parse_timestamp(&row.calculated_at)?,
            status: row.status,
        })
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, Error> {
    Decimal::from_str(text)
        .map_err(|e| Error::from(StorageError::SerializationError(format!("{}: {}", text, e))))
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::from(StorageError::SerializationError(format!("{}: {}", text, e))))
}
