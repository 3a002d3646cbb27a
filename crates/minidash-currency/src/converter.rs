//! The converter widget: form state, conversion flow and rate lookup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;

use minidash_core::CurrencyConfig;

use crate::cache::{Clock, RateCache, SystemClock};
use crate::client::RatesClient;
use crate::debounce::Debouncer;
use crate::error::CurrencyError;
use crate::format::{format_or_fallback, sort_currency_codes};
use crate::types::{parse_amount, Conversion, CurrencyView, ResultDisplay};

/// Base used to discover the list of supported codes
const LISTING_BASE: &str = "USD";
const DEFAULT_FROM: &str = "EUR";
const DEFAULT_TO: &str = "USD";
const DEFAULT_AMOUNT: &str = "1";

pub const MSG_LOAD_FAILED: &str = "Failed to load currencies. Please refresh the page.";
pub const MSG_SELECT_BOTH: &str = "Please select both currencies";
pub const MSG_CONVERSION_FAILED: &str = "Conversion failed. Please try again.";

/// One converter form. Owns its view state and rate cache; construct one
/// per session and share it behind an `Arc` so debounced edits can call back.
pub struct CurrencyConverter {
    client: RatesClient,
    cache: Mutex<RateCache>,
    view: Mutex<CurrencyView>,
    debouncer: Debouncer,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CurrencyConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConverter")
            .field("client", &self.client)
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

impl CurrencyConverter {
    pub fn new(config: &CurrencyConfig) -> Result<Self, CurrencyError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &CurrencyConfig, clock: Arc<dyn Clock>) -> Result<Self, CurrencyError> {
        let client = RatesClient::new(
            &config.rates_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self {
            client,
            cache: Mutex::new(RateCache::new(Duration::from_secs(config.cache_ttl_secs))),
            view: Mutex::new(CurrencyView::default()),
            debouncer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            clock,
        })
    }

    /// Snapshot of what the form currently shows
    pub fn view(&self) -> CurrencyView {
        self.view.lock().clone()
    }

    /// Fetch supported codes and fill both selectors.
    ///
    /// On success the form is reset to 1 EUR -> USD. On failure the error is
    /// shown and the selectors stay empty. The loading flag is cleared either way.
    pub async fn load_currencies(&self) -> Result<Vec<String>, CurrencyError> {
        self.set_loading(true);
        let outcome = self.client.fetch_rates(LISTING_BASE).await;
        self.set_loading(false);

        match outcome {
            Ok(table) => {
                let codes = sort_currency_codes(table.codes());
                tracing::info!("Loaded {} currencies", codes.len());

                let mut view = self.view.lock();
                view.from_options = codes.clone();
                view.to_options = codes.clone();
                view.from = pick_default(&codes, DEFAULT_FROM);
                view.to = pick_default(&codes, DEFAULT_TO);
                view.amount = DEFAULT_AMOUNT.to_string();
                Ok(codes)
            }
            Err(e) => {
                tracing::error!("Error loading currencies: {}", e);
                self.show_error(MSG_LOAD_FAILED);
                Err(e)
            }
        }
    }

    /// Convert the current amount with the current selections.
    ///
    /// Returns `Ok(None)` when the amount is missing or not positive; the
    /// result panel is hidden in that case and nothing is fetched.
    pub async fn convert(&self) -> Result<Option<Conversion>, CurrencyError> {
        let (amount_text, from, to) = {
            let view = self.view.lock();
            (view.amount.clone(), view.from.clone(), view.to.clone())
        };

        let Some(amount) = parse_amount(&amount_text) else {
            self.view.lock().result = None;
            return Ok(None);
        };

        let (Some(from), Some(to)) = (from, to) else {
            self.show_error(MSG_SELECT_BOTH);
            return Err(CurrencyError::MissingSelection);
        };

        if from == to {
            let conversion = Conversion {
                amount,
                converted: amount,
                from,
                to,
                rate: 1.0,
            };
            self.display(&conversion);
            return Ok(Some(conversion));
        }

        {
            let mut view = self.view.lock();
            view.loading = true;
            view.error = None;
        }

        let outcome = self.get_rate(&from, &to).await;
        self.set_loading(false);

        match outcome {
            Ok(rate) => {
                let conversion = Conversion {
                    amount,
                    converted: amount * rate,
                    from,
                    to,
                    rate,
                };
                self.display(&conversion);
                Ok(Some(conversion))
            }
            Err(e) => {
                tracing::error!("Conversion error ({} -> {}): {}", from, to, e);
                self.show_error(MSG_CONVERSION_FAILED);
                Err(e)
            }
        }
    }

    /// Rate for `from -> to`, served from cache while fresh.
    pub async fn get_rate(&self, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let cached = self.cache.lock().get_fresh(from, to, self.clock.now());
        if let Some(rate) = cached {
            tracing::debug!("Using cached rate {} -> {}", from, to);
            return Ok(rate);
        }

        let table = self.client.fetch_rates(from).await?;
        let rate = table.rate_for(to).ok_or_else(|| CurrencyError::RateNotFound {
            from: from.to_string(),
            to: to.to_string(),
        })?;

        self.cache.lock().insert(from, to, rate, self.clock.now());
        Ok(rate)
    }

    /// Exchange source and target. Converts once if an amount was entered
    /// and both currencies were selected.
    pub async fn swap(&self) -> Result<Option<Conversion>, CurrencyError> {
        let should_convert = {
            let mut view = self.view.lock();
            let from = view.from.take();
            let to = view.to.take();
            let both_set = from.is_some() && to.is_some();
            view.from = to;
            view.to = from;
            both_set && !view.amount.is_empty()
        };

        if should_convert {
            self.convert().await
        } else {
            Ok(None)
        }
    }

    /// User typed in the amount field: store it and convert after the quiet
    /// period, replacing any conversion still waiting.
    pub fn edit_amount(self: &Arc<Self>, text: &str) {
        self.set_amount(text);

        let this = Arc::clone(self);
        self.debouncer.schedule(async move {
            if let Err(e) = this.convert().await {
                tracing::debug!("Debounced conversion failed: {}", e);
            }
        });
    }

    /// User picked a new source currency
    pub async fn choose_from(&self, code: &str) -> Result<Option<Conversion>, CurrencyError> {
        self.view.lock().from = normalize_code(code);
        self.convert().await
    }

    /// User picked a new target currency
    pub async fn choose_to(&self, code: &str) -> Result<Option<Conversion>, CurrencyError> {
        self.view.lock().to = normalize_code(code);
        self.convert().await
    }

    /// Enter key or Convert button: convert now, dropping any pending edit timer
    pub async fn submit(&self) -> Result<Option<Conversion>, CurrencyError> {
        self.debouncer.cancel();
        self.convert().await
    }

    /// Set the amount field without triggering a conversion
    pub fn set_amount(&self, text: &str) {
        self.view.lock().amount = text.to_string();
    }

    /// Set both selections without triggering a conversion
    pub fn set_pair(&self, from: &str, to: &str) {
        let mut view = self.view.lock();
        view.from = normalize_code(from);
        view.to = normalize_code(to);
    }

    #[cfg(test)]
    pub(crate) fn has_pending_conversion(&self) -> bool {
        self.debouncer.is_pending()
    }

    #[cfg(test)]
    pub(crate) fn cached_rates(&self) -> usize {
        self.cache.lock().len()
    }

    fn display(&self, conversion: &Conversion) {
        let updated = Local::now().format("%-I:%M:%S %p");
        let display = ResultDisplay {
            summary: format!(
                "{} = {}",
                format_or_fallback(conversion.amount, &conversion.from),
                format_or_fallback(conversion.converted, &conversion.to)
            ),
            rate_line: format!(
                "1 {} = {:.6} {}",
                conversion.from, conversion.rate, conversion.to
            ),
            updated: format!("Last updated: {}", updated),
        };

        let mut view = self.view.lock();
        view.result = Some(display);
        view.error = None;
    }

    fn show_error(&self, message: &str) {
        self.view.lock().error = Some(message.to_string());
    }

    fn set_loading(&self, loading: bool) {
        self.view.lock().loading = loading;
    }
}

fn pick_default(codes: &[String], code: &str) -> Option<String> {
    codes.iter().find(|c| c.as_str() == code).cloned()
}

fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_ascii_uppercase())
    }
}
