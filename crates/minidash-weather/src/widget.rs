//! The weather panel: city search, location lookup, and what is shown.

use parking_lot::Mutex;

use minidash_core::WeatherConfig;

use crate::location::LocationSource;
use crate::provider::WeatherProvider;
use crate::types::{WeatherError, WeatherReport, WeatherStatus, WeatherView};

pub const MSG_ENTER_CITY: &str = "Please enter a city name.";
pub const MSG_CITY_NOT_FOUND: &str = "Could not find weather for that city. Please try again.";
pub const MSG_LOCATION_FAILED: &str =
    "Could not load weather for your location. Try searching for a city.";
pub const MSG_LOCATION_PROMPT: &str =
    "Enable location access or search for a city to see the weather.";

/// One weather panel. Lookups are independent: nothing is cached and
/// overlapping lookups are not serialized, so the last one to finish is shown.
#[derive(Debug)]
pub struct WeatherWidget {
    provider: WeatherProvider,
    location: LocationSource,
    view: Mutex<WeatherView>,
}

impl WeatherWidget {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let provider = WeatherProvider::new(config)?;
        Ok(Self::with_parts(
            provider,
            LocationSource::from_config(&config.location),
        ))
    }

    pub fn with_parts(provider: WeatherProvider, location: LocationSource) -> Self {
        Self {
            provider,
            location,
            view: Mutex::new(WeatherView::default()),
        }
    }

    pub fn view(&self) -> WeatherView {
        self.view.lock().clone()
    }

    /// Page-load flow: use the current location if one is available,
    /// otherwise prompt for a city search without touching the network.
    pub async fn load_initial(&self) -> Result<WeatherReport, WeatherError> {
        match self.location.current_location().await {
            Ok(location) => {
                self.lookup_by_coordinates(location.latitude, location.longitude)
                    .await
            }
            Err(e) => {
                tracing::info!("No location for initial weather: {}", e);
                self.set_status(WeatherStatus::Prompt(MSG_LOCATION_PROMPT.to_string()));
                Err(e.into())
            }
        }
    }

    pub async fn lookup_by_city(&self, name: &str) -> Result<WeatherReport, WeatherError> {
        let city = name.trim();
        if city.is_empty() {
            self.set_status(WeatherStatus::Prompt(MSG_ENTER_CITY.to_string()));
            return Err(WeatherError::EmptyCity);
        }

        self.set_status(WeatherStatus::Loading);
        let outcome = self.provider.by_city(city).await;
        self.render(outcome, MSG_CITY_NOT_FOUND)
    }

    pub async fn lookup_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport, WeatherError> {
        self.set_status(WeatherStatus::Loading);
        let outcome = self.provider.by_coordinates(latitude, longitude).await;
        self.render(outcome, MSG_LOCATION_FAILED)
    }

    fn render(
        &self,
        outcome: Result<WeatherReport, WeatherError>,
        failure_message: &str,
    ) -> Result<WeatherReport, WeatherError> {
        match outcome {
            Ok(report) => {
                self.set_status(WeatherStatus::Ready(report.clone()));
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Weather lookup failed: {}", e);
                self.set_status(WeatherStatus::Error(failure_message.to_string()));
                Err(e)
            }
        }
    }

    fn set_status(&self, status: WeatherStatus) {
        self.view.lock().status = status;
    }
}
