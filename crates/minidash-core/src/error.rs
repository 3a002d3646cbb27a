//! Centralized error types for the dashboard.
//!
//! Widget crates keep their own detailed error enums and convert into
//! [`AppError`] at the application boundary, where `user_message()` gives a
//! short text that is safe to show next to the widget.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Currency service error: {0}")]
    Currency(#[from] CurrencyServiceError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherServiceError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Currency(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Currency conversion errors.
#[derive(Debug, Error)]
pub enum CurrencyServiceError {
    #[error("No rate from {from} to {to}")]
    RateNotFound { from: String, to: String },

    #[error("Missing currency selection")]
    MissingSelection,

    #[error("Malformed rates response: {0}")]
    MalformedResponse(String),

    #[error("Rates service unavailable")]
    ServiceUnavailable,
}

impl CurrencyServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CurrencyServiceError::RateNotFound { .. } => {
                "No exchange rate is available for that pair."
            }
            CurrencyServiceError::MissingSelection => "Please select both currencies",
            CurrencyServiceError::MalformedResponse(_) | CurrencyServiceError::ServiceUnavailable => {
                "Conversion failed. Please try again."
            }
        }
    }
}

/// Weather lookup errors.
#[derive(Debug, Error)]
pub enum WeatherServiceError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Location access denied")]
    LocationDenied,

    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),

    #[error("No city name given")]
    EmptyCity,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl WeatherServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherServiceError::CityNotFound(_) | WeatherServiceError::MalformedResponse(_) => {
                "Could not find weather for that city. Please try again."
            }
            WeatherServiceError::EmptyCity => "Please enter a city name.",
            WeatherServiceError::LocationDenied => {
                "Enable location access or search for a city to see the weather."
            }
            WeatherServiceError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherServiceError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let err = WeatherServiceError::LocationDenied;
        let app_err: AppError = err.into();
        assert!(matches!(
            app_err,
            AppError::Weather(WeatherServiceError::LocationDenied)
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Currency(CurrencyServiceError::MissingSelection);
        assert_eq!(app_err.user_message(), "Please select both currencies");
    }

    #[test]
    fn test_server_error_messages_split_on_5xx() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "down".into(),
        };
        let client = NetworkError::ServerError {
            status: 404,
            message: "missing".into(),
        };
        assert!(server.user_message().contains("later"));
        assert_eq!(client.user_message(), "The request failed. Please try again.");
    }

    #[test]
    fn test_city_not_found_message_is_fixed() {
        let a = WeatherServiceError::CityNotFound("Atlantis".into()).user_message();
        let b = WeatherServiceError::MalformedResponse("no main".into()).user_message();
        assert_eq!(a, b);
        assert!(!a.contains("Atlantis"));
    }

    #[test]
    fn test_empty_city_asks_for_a_name() {
        let app_err = AppError::Weather(WeatherServiceError::EmptyCity);
        assert_eq!(app_err.user_message(), "Please enter a city name.");
    }

    #[test]
    fn test_rates_service_unavailable_message() {
        let app_err = AppError::Currency(CurrencyServiceError::ServiceUnavailable);
        assert_eq!(app_err.user_message(), "Conversion failed. Please try again.");
    }
}
