//! ERP transport error types.

use thiserror::Error;

use encargos_core::errors::{Error as CoreError, SourceError};

#[derive(Error, Debug)]
pub enum ErpError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ERP answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Login failed: {0}")]
    Auth(String),

    #[error("Unexpected ERP payload: {0}")]
    Payload(String),
}

impl From<ErpError> for CoreError {
    fn from(err: ErpError) -> Self {
        match err {
            ErpError::Http(e) => CoreError::Source(SourceError::Unavailable(e.to_string())),
            ErpError::Status { status, body } => {
                CoreError::Source(SourceError::Unavailable(format!("{}: {}", status, body)))
            }
            ErpError::Auth(msg) => CoreError::Source(SourceError::Auth(msg)),
            ErpError::Payload(msg) => CoreError::Source(SourceError::Payload(msg)),
        }
    }
}
