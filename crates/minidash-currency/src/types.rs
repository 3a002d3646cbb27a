use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rates for one base currency, as returned by the rates endpoint.
///
/// `rates` is required: a body without it fails to decode instead of
/// producing an empty table.
#[derive(Debug, Clone, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    pub base: Option<String>,
    pub rates: BTreeMap<String, f64>,
}

impl RateTable {
    /// Rate for `code`, ignoring non-positive or non-finite entries
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

/// Outcome of a single conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: f64,
    pub converted: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
}

/// Rendered result panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultDisplay {
    /// e.g. "€10.00 = $10.80"
    pub summary: String,
    /// e.g. "1 EUR = 1.080000 USD"
    pub rate_line: String,
    pub updated: String,
}

/// Everything the converter form shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencyView {
    pub amount: String,
    pub from_options: Vec<String>,
    pub to_options: Vec<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub result: Option<ResultDisplay>,
    pub error: Option<String>,
    pub loading: bool,
}

impl CurrencyView {
    /// The convert button is disabled while a request is in flight
    pub fn convert_enabled(&self) -> bool {
        !self.loading
    }
}

/// Parse the amount field. Empty, non-numeric, non-finite and non-positive
/// input all yield `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}
