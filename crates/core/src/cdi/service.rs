//! CDI accumulation service.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::errors::CdiError;
use super::model::{LostInterest, RateSample};
use super::source::RateSource;
use crate::errors::Result;

/// What to do when an accrual window contains no published rate.
///
/// Defaulting the factor to 1 favors availability: a window with no rates
/// accrues nothing and the calculation proceeds. `Fail` favors correctness
/// and turns the gap into a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingRatePolicy {
    #[default]
    AssumeNoAccrual,
    Fail,
}

#[derive(Clone)]
pub struct CdiService {
    source: Arc<dyn RateSource>,
    missing_rate_policy: MissingRatePolicy,
}

impl CdiService {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self::with_policy(source, MissingRatePolicy::default())
    }

    pub fn with_policy(source: Arc<dyn RateSource>, missing_rate_policy: MissingRatePolicy) -> Self {
        Self {
            source,
            missing_rate_policy,
        }
    }

    /// Compounded accumulation factor for the half-open window
    /// `(start_exclusive, end_inclusive]`.
    ///
    /// Rates apply to days *after* the reference date, never the reference
    /// date itself, so the lookup starts one calendar day past
    /// `start_exclusive`. A degenerate window (`start >= end`) accrues
    /// nothing and yields 1.
    pub async fn accumulated_factor(
        &self,
        start_exclusive: NaiveDate,
        end_inclusive: NaiveDate,
    ) -> Result<Decimal> {
        if start_exclusive >= end_inclusive {
            return Ok(Decimal::ONE);
        }

        let samples = self.accrual_samples(start_exclusive, end_inclusive).await?;
        if samples.is_empty() {
            return self.on_missing_rates(start_exclusive, end_inclusive);
        }

        Ok(compound(&samples))
    }

    /// Interest lost on `principal` between a due date and a later payment
    /// date, via compound capitalization of the daily rates in between.
    ///
    /// Lateness itself is the caller's decision; this computes the magnitude
    /// for a given interval. A payment on or before the due date yields the
    /// zero outcome. Each published sample in the accrual window counts as
    /// one late day.
    pub async fn lost_interest(
        &self,
        principal: Decimal,
        due_date: NaiveDate,
        payment_date: NaiveDate,
    ) -> Result<LostInterest> {
        if payment_date <= due_date {
            return Ok(LostInterest::none());
        }

        let samples = self.accrual_samples(due_date, payment_date).await?;
        if samples.is_empty() {
            self.on_missing_rates(due_date, payment_date)?;
            return Ok(LostInterest::none());
        }

        let factor = compound(&samples);
        Ok(LostInterest {
            lost_interest: principal * (factor - Decimal::ONE),
            accumulated_factor: factor,
            late_days: samples.len() as i64,
        })
    }

    /// Fetches, sorts and cleans the samples for one accrual window: one
    /// sample per day (duplicates never double-compound), zero/negative
    /// rates skipped.
    async fn accrual_samples(
        &self,
        start_exclusive: NaiveDate,
        end_inclusive: NaiveDate,
    ) -> Result<Vec<RateSample>> {
        let window_start = start_exclusive
            .checked_add_days(Days::new(1))
            .unwrap_or(end_inclusive);

        let mut samples = self
            .source
            .rates_in_window(window_start, end_inclusive)
            .await?;

        // The source is not guaranteed sorted.
        samples.sort_by_key(|s| s.date);
        samples.dedup_by_key(|s| s.date);
        samples.retain(|s| s.daily_rate > Decimal::ZERO);
        Ok(samples)
    }

    fn on_missing_rates(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal> {
        match self.missing_rate_policy {
            MissingRatePolicy::AssumeNoAccrual => {
                log::warn!(
                    "no CDI rates found between {} and {}, assuming no accrual",
                    start,
                    end
                );
                Ok(Decimal::ONE)
            }
            MissingRatePolicy::Fail => Err(CdiError::NoRatesInWindow { start, end }.into()),
        }
    }
}

/// Compound capitalization: Π (1 + rate/100) over the samples.
fn compound(samples: &[RateSample]) -> Decimal {
    samples.iter().fold(Decimal::ONE, |factor, sample| {
        factor * (Decimal::ONE + sample.daily_rate / dec!(100))
    })
}
