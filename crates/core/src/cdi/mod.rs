//! CDI rate accumulation.
//!
//! The CDI (Brazilian interbank daily reference rate) drives two figures in a
//! calculation:
//!
//! - the compounded accumulation factor over a date window, and
//! - the "lost interest" on a late payment, derived from that factor.
//!
//! Rates are fetched through the [`source::RateSource`] trait so the service
//! can be exercised against mocks; the production implementation lives in the
//! ERP adapter crate.

pub mod errors;
pub mod model;
pub mod service;
pub mod source;


pub use errors::CdiError;
pub use model::{LostInterest, RateSample};
pub use service::{CdiService, MissingRatePolicy};
pub use source::RateSource;
