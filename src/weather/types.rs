use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::ms_to_kmh;

/// Condition code used when the provider omits one (clear sky).
pub const DEFAULT_CONDITION_CODE: i32 = 800;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("PM2.5 concentration cannot be negative, got {0}")]
    NegativePm25(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("Invalid weather data received: missing main block")]
    MissingWeatherMain,
    #[error("Invalid AQI data received: empty list")]
    MissingAqiEntry,
}

/// One weather and air quality snapshot, already mapped from provider units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub condition_code: i32,
    pub description: String,
    pub pm25: f64,
}

impl Reading {
    pub fn validate(&self) -> Result<(), ReadingError> {
        let fields = [
            ("temperature_c", self.temperature_c),
            ("feels_like_c", self.feels_like_c),
            ("humidity_pct", self.humidity_pct),
            ("wind_speed_kmh", self.wind_speed_kmh),
            ("pm25", self.pm25),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ReadingError::NonFinite { field, value });
            }
        }

        if self.pm25 < 0.0 {
            return Err(ReadingError::NegativePm25(self.pm25));
        }

        Ok(())
    }

    /// Map the two provider payloads into a reading, defaulting absent fields.
    pub fn from_responses(
        weather: &CurrentWeatherResponse,
        air: &AirPollutionResponse,
    ) -> Result<Self, PayloadError> {
        let main = weather.main.as_ref().ok_or(PayloadError::MissingWeatherMain)?;
        let air_entry = air.list.first().ok_or(PayloadError::MissingAqiEntry)?;
        let condition = weather.weather.first();

        let temperature_c = main.temp.unwrap_or(0.0);

        Ok(Self {
            temperature_c,
            feels_like_c: main.feels_like.unwrap_or(temperature_c),
            humidity_pct: main.humidity.unwrap_or(0.0),
            wind_speed_kmh: ms_to_kmh(weather.wind.as_ref().and_then(|w| w.speed).unwrap_or(0.0)),
            condition_code: condition.and_then(|c| c.id).unwrap_or(DEFAULT_CONDITION_CODE),
            description: condition
                .and_then(|c| c.description.as_deref())
                .filter(|d| !d.is_empty())
                .map_or_else(|| "UNKNOWN".to_string(), str::to_uppercase),
            pm25: air_entry.components.pm2_5.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub main: Option<WeatherMain>,
    pub wind: Option<WeatherWind>,
    pub name: Option<String>,
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: Option<i32>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherWind {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirPollutionEntry {
    pub dt: Option<i64>,
    pub main: Option<AirQualityIndex>,
    #[serde(default)]
    pub components: AirComponents,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirQualityIndex {
    pub aqi: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirComponents {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn air(pm25: f64) -> AirPollutionResponse {
        serde_json::from_value(json!({
            "list": [{ "dt": 1732430000, "main": { "aqi": 3 }, "components": { "pm2_5": pm25, "pm10": 40.1 } }]
        }))
        .unwrap()
    }

    #[test]
    fn test_reading_from_full_payload() {
        let weather: CurrentWeatherResponse = serde_json::from_value(json!({
            "weather": [{ "id": 501, "main": "Rain", "description": "moderate rain", "icon": "10d" }],
            "main": { "temp": 26.4, "feels_like": 27.1, "humidity": 48, "pressure": 1012 },
            "wind": { "speed": 2.5, "deg": 90 },
            "name": "Hanoi",
            "dt": 1732430000
        }))
        .unwrap();

        let reading = Reading::from_responses(&weather, &air(15.3)).unwrap();
        assert_eq!(reading.temperature_c, 26.4);
        assert_eq!(reading.feels_like_c, 27.1);
        assert_eq!(reading.humidity_pct, 48.0);
        assert!((reading.wind_speed_kmh - 9.0).abs() < 1e-9);
        assert_eq!(reading.condition_code, 501);
        assert_eq!(reading.description, "MODERATE RAIN");
        assert_eq!(reading.pm25, 15.3);
        assert!(reading.validate().is_ok());
    }

    #[test]
    fn test_reading_defaults_missing_fields() {
        let weather: CurrentWeatherResponse = serde_json::from_value(json!({
            "main": { "temp": 18.0 }
        }))
        .unwrap();
        let air: AirPollutionResponse = serde_json::from_value(json!({ "list": [{}] })).unwrap();

        let reading = Reading::from_responses(&weather, &air).unwrap();
        assert_eq!(reading.feels_like_c, 18.0);
        assert_eq!(reading.humidity_pct, 0.0);
        assert_eq!(reading.wind_speed_kmh, 0.0);
        assert_eq!(reading.condition_code, DEFAULT_CONDITION_CODE);
        assert_eq!(reading.description, "UNKNOWN");
        assert_eq!(reading.pm25, 0.0);
    }

    #[test]
    fn test_reading_rejects_incomplete_payloads() {
        let no_main = CurrentWeatherResponse::default();
        assert_eq!(
            Reading::from_responses(&no_main, &air(5.0)),
            Err(PayloadError::MissingWeatherMain)
        );

        let weather: CurrentWeatherResponse =
            serde_json::from_value(json!({ "main": { "temp": 20.0 } })).unwrap();
        assert_eq!(
            Reading::from_responses(&weather, &AirPollutionResponse::default()),
            Err(PayloadError::MissingAqiEntry)
        );
    }

    #[test]
    fn test_validate_rejects_domain_violations() {
        let reading = Reading {
            temperature_c: 20.0,
            feels_like_c: 20.0,
            humidity_pct: 50.0,
            wind_speed_kmh: 5.0,
            condition_code: 800,
            description: "CLEAR SKY".to_string(),
            pm25: -3.0,
        };
        assert_eq!(reading.validate(), Err(ReadingError::NegativePm25(-3.0)));

        let reading = Reading { pm25: 10.0, humidity_pct: f64::INFINITY, ..reading };
        assert!(matches!(
            reading.validate(),
            Err(ReadingError::NonFinite { field: "humidity_pct", .. })
        ));
    }
}
