use minidash_core::{AppError, NetworkError, ReqwestErrorExt, WeatherServiceError};
use serde::{Deserialize, Serialize};

/// Geographic location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location_name: String,
    pub country: String,
    /// Whole degrees Celsius
    pub temperature: i32,
    /// `weather[0].main`, e.g. "Clouds"
    pub summary: String,
    /// `weather[0].description`, e.g. "overcast clouds"
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    /// Metres per second
    pub wind_speed: f64,
}

impl WeatherReport {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }

    /// Text lines in display order
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{}, {}", self.location_name, self.country),
            format!("{}°C", self.temperature),
            format!("{} ({})", self.summary, self.description),
            format!("Humidity: {}%", self.humidity),
            format!("Wind: {} m/s", self.wind_speed),
        ]
    }
}

/// What the weather panel is showing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum WeatherStatus {
    #[default]
    Idle,
    Loading,
    /// Asks the user to do something (enter a city, allow location)
    Prompt(String),
    Error(String),
    Ready(WeatherReport),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherView {
    pub status: WeatherStatus,
}

impl WeatherView {
    /// The search button is disabled while a lookup is in flight
    pub fn search_enabled(&self) -> bool {
        !matches!(self.status, WeatherStatus::Loading)
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match &self.status {
            WeatherStatus::Ready(report) => Some(report),
            _ => None,
        }
    }

    /// Text for the panel when it isn't showing a report
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            WeatherStatus::Loading => Some("Loading weather..."),
            WeatherStatus::Prompt(msg) | WeatherStatus::Error(msg) => Some(msg),
            WeatherStatus::Idle | WeatherStatus::Ready(_) => None,
        }
    }
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("No weather found for {0}")]
    NotFound(String),
    #[error("Weather API rejected the API key")]
    InvalidApiKey,
    #[error("Weather service returned HTTP {status}")]
    Status { status: u16 },
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),
    #[error("City name is empty")]
    EmptyCity,
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::Network(err) => AppError::Network(err.into_network_error()),
            WeatherError::NotFound(query) => {
                AppError::Weather(WeatherServiceError::CityNotFound(query))
            }
            WeatherError::InvalidApiKey => AppError::Weather(WeatherServiceError::InvalidApiKey),
            WeatherError::Status { status } if status >= 500 => {
                AppError::Weather(WeatherServiceError::ServiceUnavailable)
            }
            WeatherError::Status { status } => AppError::Network(NetworkError::ServerError {
                status,
                message: "weather request failed".to_string(),
            }),
            WeatherError::MalformedResponse(msg) => {
                AppError::Weather(WeatherServiceError::MalformedResponse(msg))
            }
            WeatherError::EmptyCity => AppError::Weather(WeatherServiceError::EmptyCity),
            WeatherError::Location(_) => AppError::Weather(WeatherServiceError::LocationDenied),
        }
    }
}
