//! Installment and movement models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scheduled payment installment.
///
/// Either supplied by the caller (manual override) or normalized from
/// fetched ERP parcels. Never mutated after creation; consumed once into a
/// [`Movement`]. The principal is in the process currency (typically USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub principal: Decimal,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub elapsed_days: i64,
    #[serde(default)]
    pub description: String,
}

/// The result of applying a daily rate to an [`Installment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub date: NaiveDate,
    pub description: String,
    pub elapsed_days: i64,
    pub spot_rate: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub total: Decimal,
}
