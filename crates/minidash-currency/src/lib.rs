//! Currency converter widget for Minidash
//!
//! Converts amounts between currencies using a public rates endpoint, with a
//! short-lived in-memory rate cache and debounced re-conversion on input.

pub mod cache;
pub mod client;
pub mod converter;
pub mod debounce;
pub mod error;
pub mod format;
pub mod types;

pub use cache::{Clock, RateCache, SystemClock};
pub use client::RatesClient;
pub use converter::CurrencyConverter;
pub use debounce::Debouncer;
pub use error::{CurrencyError, FormatError};
pub use format::{format_currency, format_or_fallback, sort_currency_codes, POPULAR_CURRENCIES};
pub use types::*;
