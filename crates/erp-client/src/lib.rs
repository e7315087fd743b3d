//! Conexos ERP adapter.
//!
//! Everything transport-related lives here: the authenticated session handle
//! (cookie `sid` with expiry and refresh-and-retry-once on 401), the
//! paginated list-query envelope, and the normalization of raw ERP rows into
//! the canonical types the engine consumes. The core crate never sees a raw
//! ERP field name.
//!
//! The client implements the engine's source traits (`RateSource`,
//! `ProcessSource`, `TitleSource`, `ExpenseSink`), so it can be swapped for
//! mocks in tests.

pub mod client;
pub mod envelope;
pub mod errors;
pub mod models;
pub mod session;
pub mod sources;

pub use client::{ErpClient, ErpConfig};
pub use errors::ErpError;
