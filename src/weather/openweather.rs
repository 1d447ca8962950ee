use super::types::*;
use crate::config::Config;
use crate::utils::validate_coordinates;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("Rate limited, retry after: {0}s")]
    RateLimited(u64),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("{0}")]
    InvalidPayload(#[from] PayloadError),
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(config: Config, api_key: String) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("WeaAqiDashboard/1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config, api_key })
    }

    pub async fn get_current_weather(&self) -> Result<CurrentWeatherResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_weather_path
        );

        let response = self
            .make_request_with_retry(&url, &[("units", "metric")])
            .await?;

        Ok(serde_json::from_value(response)?)
    }

    pub async fn get_air_pollution(&self) -> Result<AirPollutionResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_air_pollution_path
        );

        let response = self.make_request_with_retry(&url, &[]).await?;

        Ok(serde_json::from_value(response)?)
    }

    /// Fetch both endpoints concurrently and map them into a reading.
    pub async fn fetch_reading(&self) -> Result<Reading, OpenWeatherError> {
        validate_coordinates(self.config.lat, self.config.lon)
            .map_err(OpenWeatherError::InvalidCoordinates)?;

        let (weather, air) =
            tokio::try_join!(self.get_current_weather(), self.get_air_pollution())?;

        tracing::debug!(
            condition_count = weather.weather.len(),
            aqi_entries = air.list.len(),
            "Fetched weather and air pollution data"
        );

        Ok(Reading::from_responses(&weather, &air)?)
    }

    async fn make_request_with_retry(
        &self,
        url: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<Value, OpenWeatherError> {
        let lat = self.config.lat.to_string();
        let lon = self.config.lon.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("appid", self.api_key.as_str()),
        ];
        params.extend_from_slice(extra_params);

        let mut retry_count = 0;
        let max_retries = 3;
        let mut delay = Duration::from_millis(1000);

        loop {
            let response = self.client.get(url).query(&params).send().await?;

            match response.status() {
                reqwest::StatusCode::OK => {
                    let json: Value = response.json().await?;
                    return Ok(json);
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retry_count >= max_retries {
                        return Err(OpenWeatherError::RateLimited(delay.as_secs()));
                    }

                    tracing::warn!(
                        "Rate limited by OpenWeather API, retrying in {}ms",
                        delay.as_millis()
                    );

                    sleep(delay).await;
                    delay = delay.mul_f32(2.0 + fastrand::f32() * 0.5); // Exponential backoff with jitter
                    retry_count += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(OpenWeatherError::ApiError(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }
}
