//! Rate lookup trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::RateSample;
use crate::errors::Result;

/// Read access to published CDI rate samples.
///
/// Implementations own transport concerns (session renewal, retry-once on
/// auth expiry); by the time an error surfaces here the adapter has given up.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Samples whose date falls inside the inclusive window.
    ///
    /// Order is not guaranteed and duplicated days may occur; the service
    /// sorts and dedupes defensively.
    async fn rates_in_window(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RateSample>>;

    /// Recent samples, most recent first. The head is treated as the current
    /// market rate.
    async fn latest_rates(&self) -> Result<Vec<RateSample>>;
}
