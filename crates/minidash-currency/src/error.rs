//! Currency-specific error types.

use minidash_core::{AppError, CurrencyServiceError, NetworkError, ReqwestErrorExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rates service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed rates response: {0}")]
    MalformedResponse(String),

    #[error("Exchange rate not found: {from} -> {to}")]
    RateNotFound { from: String, to: String },

    #[error("Please select both currencies")]
    MissingSelection,
}

/// Display formatting failures. Always recovered with a plain fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported currency code: {0:?}")]
    UnsupportedCode(String),

    #[error("Amount is not a finite number")]
    NonFinite,
}

impl From<CurrencyError> for AppError {
    fn from(e: CurrencyError) -> Self {
        match e {
            CurrencyError::Network(err) => AppError::Network(err.into_network_error()),
            CurrencyError::Status { status } if status >= 500 => {
                AppError::Currency(CurrencyServiceError::ServiceUnavailable)
            }
            CurrencyError::Status { status } => AppError::Network(NetworkError::ServerError {
                status,
                message: "rates request failed".to_string(),
            }),
            CurrencyError::MalformedResponse(msg) => {
                AppError::Currency(CurrencyServiceError::MalformedResponse(msg))
            }
            CurrencyError::RateNotFound { from, to } => {
                AppError::Currency(CurrencyServiceError::RateNotFound { from, to })
            }
            CurrencyError::MissingSelection => {
                AppError::Currency(CurrencyServiceError::MissingSelection)
            }
        }
    }
}
