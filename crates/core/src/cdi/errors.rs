//! CDI-specific error types.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdiError {
    /// No usable rate samples were published inside the accrual window.
    ///
    /// Only raised under [`MissingRatePolicy::Fail`](super::MissingRatePolicy);
    /// the default policy substitutes an identity factor instead.
    #[error("No CDI rates published between {start} and {end}")]
    NoRatesInWindow { start: NaiveDate, end: NaiveDate },
}
