//! CDI rate domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A daily CDI rate sample.
///
/// The rate is a percentage per day: `0.045` means 0.045% a day. Samples are
/// immutable and externally sourced; at most one sample per calendar day is
/// meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSample {
    pub date: NaiveDate,
    pub daily_rate: Decimal,
}

impl RateSample {
    pub fn new(date: NaiveDate, daily_rate: Decimal) -> Self {
        Self { date, daily_rate }
    }
}

/// Interest lost to a late payment, measured over the accrual window between
/// due date (exclusive) and payment date (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostInterest {
    pub lost_interest: Decimal,
    pub accumulated_factor: Decimal,
    pub late_days: i64,
}

impl LostInterest {
    /// The on-time outcome: nothing lost, identity factor, no late days.
    pub fn none() -> Self {
        Self {
            lost_interest: Decimal::ZERO,
            accumulated_factor: Decimal::ONE,
            late_days: 0,
        }
    }
}
