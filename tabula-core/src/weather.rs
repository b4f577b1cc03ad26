//! Weather line for the dashboard.
//!
//! Fetches current conditions from OpenWeatherMap and formats them as
//! `21°C, Clear Sky`. The provider sits behind a trait so the dashboard can
//! be tested without a network; fetch failures degrade to an absent weather
//! line and are never surfaced as errors.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::WeatherError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Current conditions at the configured location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Temperature in whole degrees celsius, floored.
    pub temp_celsius: i32,
    /// Condition summary as reported, e.g. "clear sky".
    pub condition: String,
}

impl WeatherReport {
    /// Render the report for the dashboard. `unit` is "cel" or "fah".
    pub fn format(&self, unit: &str) -> String {
        let temp = if unit == "fah" {
            format!("{}°F", to_fahrenheit(self.temp_celsius))
        } else {
            format!("{}°C", self.temp_celsius)
        };
        format!("{temp}, {}", title_case(&self.condition))
    }
}

/// Floored celsius-to-fahrenheit conversion.
pub fn to_fahrenheit(celsius: i32) -> i32 {
    (celsius as f64 * 9.0 / 5.0 + 32.0).floor() as i32
}

/// Uppercase the first letter of every whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Weather service boundary.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &str) -> Result<WeatherReport, WeatherError>;
}

/// OpenWeatherMap current-weather endpoint.
pub struct OpenWeatherMap {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
}

impl OpenWeatherMap {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint("https://api.openweathermap.org/data/2.5/weather", api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMap {
    async fn current(&self, location: &str) -> Result<WeatherReport, WeatherError> {
        // The API wants "City,country"; config files tend to use spaces.
        let location = location.replace(' ', ",");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Request {
                message: e.to_string(),
            })?;

        let payload: OwmResponse = response.json().await.map_err(|e| WeatherError::Payload {
            message: e.to_string(),
        })?;

        let condition = payload
            .weather
            .first()
            .map(|c| c.main.clone())
            .ok_or_else(|| WeatherError::Payload {
                message: "empty weather array".into(),
            })?;

        Ok(WeatherReport {
            temp_celsius: payload.main.temp.floor() as i32,
            condition,
        })
    }
}
