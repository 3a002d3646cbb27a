//! Rates endpoint client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::instrument;

use crate::error::CurrencyError;
use crate::types::RateTable;

const USER_AGENT: &str = concat!("minidash/", env!("CARGO_PKG_VERSION"));

/// Fetches full rate tables from `{base_url}/{BASE}`.
#[derive(Debug, Clone)]
pub struct RatesClient {
    client: Arc<Client>,
    base_url: String,
}

impl RatesClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CurrencyError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch every rate relative to `base`.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_rates(&self, base: &str) -> Result<RateTable, CurrencyError> {
        let url = format!("{}/{}", self.base_url, base);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!("Rates request for {} returned {}", base, status);
            return Err(CurrencyError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let table: RateTable = serde_json::from_str(&body)
            .map_err(|e| CurrencyError::MalformedResponse(e.to_string()))?;

        tracing::debug!("Fetched {} rates for base {}", table.rates.len(), base);
        Ok(table)
    }
}
