//! OpenWeatherMap current-weather client.

use std::sync::Arc;
use std::time::Duration;

use minidash_core::WeatherConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::types::{WeatherError, WeatherReport};

const USER_AGENT: &str = concat!("minidash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    sys: OwmSys,
    weather: Vec<OwmWeather>,
    main: OwmMain,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

impl TryFrom<OwmResponse> for WeatherReport {
    type Error = WeatherError;

    fn try_from(body: OwmResponse) -> Result<Self, Self::Error> {
        let current = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::MalformedResponse("empty weather list".to_string()))?;

        let measurements = [body.main.temp, body.main.humidity, body.wind.speed];
        if !measurements.iter().all(|v| v.is_finite()) {
            return Err(WeatherError::MalformedResponse(
                "non-finite measurement".to_string(),
            ));
        }

        Ok(WeatherReport {
            location_name: body.name,
            country: body.sys.country,
            temperature: round_half_up(body.main.temp),
            summary: current.main,
            description: current.description,
            icon: current.icon,
            humidity: round_half_up(body.main.humidity).clamp(0, 100) as u8,
            wind_speed: body.wind.speed,
        })
    }
}

/// Round to the nearest whole degree, halves towards +inf (-2.5 -> -2)
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Current weather for a city name
    #[instrument(skip(self), level = "info")]
    pub async fn by_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        self.fetch(&[("q", city.to_string())], city).await
    }

    /// Current weather at a coordinate
    #[instrument(skip(self), level = "info")]
    pub async fn by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherReport, WeatherError> {
        let label = format!("{:.4},{:.4}", latitude, longitude);
        self.fetch(
            &[("lat", latitude.to_string()), ("lon", longitude.to_string())],
            &label,
        )
        .await
    }

    async fn fetch(
        &self,
        query: &[(&str, String)],
        label: &str,
    ) -> Result<WeatherReport, WeatherError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(query)
            .query(&[("units", "metric"), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(WeatherError::NotFound(label.to_string())),
            StatusCode::UNAUTHORIZED => return Err(WeatherError::InvalidApiKey),
            _ => {
                tracing::warn!("Weather request for {} returned {}", label, status);
                return Err(WeatherError::Status {
                    status: status.as_u16(),
                });
            }
        }

        let body = response.text().await?;
        let parsed: OwmResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))?;

        let report = WeatherReport::try_from(parsed)?;
        tracing::debug!(
            "Weather for {}: {}°C, {}",
            label,
            report.temperature,
            report.description
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> WeatherProvider {
        let config = WeatherConfig {
            api_url: format!("{}/data/2.5/weather", server.uri()),
            api_key: "test_key".to_string(),
            ..WeatherConfig::default()
        };
        WeatherProvider::new(&config).unwrap()
    }

    fn london() -> serde_json::Value {
        serde_json::json!({
            "name": "London",
            "sys": { "country": "GB" },
            "weather": [{ "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d" }],
            "main": { "temp": 14.62, "feels_like": 14.1, "humidity": 81 },
            "wind": { "speed": 4.12, "deg": 240 }
        })
    }

    #[tokio::test]
    async fn test_by_city_sends_query_and_parses() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let report = provider_for(&mock_server).by_city("London").await.unwrap();

        assert_eq!(report.location_name, "London");
        assert_eq!(report.country, "GB");
        assert_eq!(report.temperature, 15);
        assert_eq!(report.summary, "Clouds");
        assert_eq!(report.description, "overcast clouds");
        assert_eq!(report.humidity, 81);
        assert_eq!(report.wind_speed, 4.12);
    }

    #[tokio::test]
    async fn test_by_coordinates_sends_lat_lon() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let report = provider_for(&mock_server)
            .by_coordinates(51.5, -0.12)
            .await
            .unwrap();
        assert_eq!(report.location_name, "London");
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).by_city("Atlantis").await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(ref q) if q == "Atlantis"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).by_city("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidApiKey));
    }

    #[tokio::test]
    async fn test_missing_fields_are_malformed() {
        let mock_server = MockServer::start().await;

        let mut body = london();
        body.as_object_mut().unwrap().remove("main");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).by_city("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_weather_list_is_malformed() {
        let mock_server = MockServer::start().await;

        let mut body = london();
        body["weather"] = serde_json::json!([]);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).by_city("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fractional_humidity_is_rounded() {
        let mock_server = MockServer::start().await;

        let mut body = london();
        body["main"]["humidity"] = serde_json::json!(80.6);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let report = provider_for(&mock_server).by_city("London").await.unwrap();
        assert_eq!(report.humidity, 81);
        assert_eq!(report.lines()[3], "Humidity: 81%");
    }

    #[tokio::test]
    async fn test_float_encoded_humidity_is_accepted() {
        let mock_server = MockServer::start().await;

        let mut body = london();
        body["main"]["humidity"] = serde_json::json!(81.0);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;

        let report = provider_for(&mock_server).by_city("London").await.unwrap();
        assert_eq!(report.humidity, 81);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(14.62), 15);
        assert_eq!(round_half_up(14.5), 15);
        assert_eq!(round_half_up(14.49), 14);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
    }
}
