//! Scheduled installment financing.
//!
//! Movements carry the straight-line financing interest on scheduled
//! installments. Unlike the CDI path this is deliberately non-compounding:
//! it prices a known upcoming schedule, not retroactive lateness against
//! actual market rates.

pub mod model;
pub mod service;

pub use model::{Installment, Movement};
pub use service::InstallmentService;
