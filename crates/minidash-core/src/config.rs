use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `weather.api_key`
pub const WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Currency converter settings
    #[serde(default)]
    pub currency: CurrencyConfig,

    /// Weather widget settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Base URL of the rates endpoint; the base currency code is appended
    #[serde(default = "default_rates_url")]
    pub rates_url: String,

    /// How long a fetched rate stays usable, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Quiet period after an amount edit before converting, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_rates_url() -> String {
    "https://api.exchangerate-api.com/v4/latest".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            rates_url: default_rates_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Current-weather endpoint
    #[serde(default = "default_weather_url")]
    pub api_url: String,

    /// OpenWeatherMap API key (can also come from `OPENWEATHER_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Where "current location" comes from
    #[serde(default)]
    pub location: LocationConfig,
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: default_weather_url(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            location: LocationConfig::default(),
        }
    }
}

/// Location sharing preference.
///
/// `share = false` behaves like a denied permission prompt. With sharing on
/// but no coordinates there is simply no location service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub share: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minidash");

        Self {
            config_dir,
            currency: CurrencyConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        if let Ok(key) = std::env::var(WEATHER_API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.weather.api_key = key.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.currency.rates_url, "currency.rates_url", &mut result);
        self.validate_url(&self.weather.api_url, "weather.api_url", &mut result);

        if self.currency.cache_ttl_secs == 0 {
            result.add_error(
                "currency.cache_ttl_secs",
                "Cache lifetime must be greater than 0",
            );
        }

        if self.currency.debounce_ms == 0 {
            result.add_warning(
                "currency.debounce_ms",
                "Debounce disabled, every keystroke triggers a conversion",
            );
        } else if self.currency.debounce_ms > 10_000 {
            result.add_warning(
                "currency.debounce_ms",
                "Debounce is more than 10 seconds",
            );
        }

        if self.currency.request_timeout_secs == 0 {
            result.add_error(
                "currency.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }
        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.weather.api_key.trim().is_empty() {
            result.add_warning(
                "weather.api_key",
                format!(
                    "No weather API key configured (set {}) - lookups will fail",
                    WEATHER_API_KEY_ENV
                ),
            );
        }

        let location = &self.weather.location;
        if let Some(lat) = location.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                result.add_error("weather.location.latitude", "Latitude must be within ±90");
            }
        }
        if let Some(lon) = location.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                result.add_error(
                    "weather.location.longitude",
                    "Longitude must be within ±180",
                );
            }
        }
        if location.share && (location.latitude.is_none() || location.longitude.is_none()) {
            result.add_warning(
                "weather.location",
                "Location sharing enabled but coordinates are incomplete",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Write the configuration as pretty TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("minidash");

        Ok(config_dir.join("config.toml"))
    }
}
