use super::types::*;

/// Fixed provider payloads used when no API key is configured.
pub struct SampleWeatherSource;

impl SampleWeatherSource {
    pub fn new() -> Self {
        Self
    }

    pub fn current_weather(&self) -> CurrentWeatherResponse {
        CurrentWeatherResponse {
            weather: vec![WeatherCondition {
                id: Some(800),
                main: Some("Clear".to_string()),
                description: Some("clear sky".to_string()),
                icon: Some("01d".to_string()),
            }],
            main: Some(WeatherMain {
                temp: Some(26.0),
                feels_like: Some(26.0),
                humidity: Some(48.0),
                pressure: Some(1012.0),
            }),
            wind: Some(WeatherWind {
                speed: Some(10.0 / 3.6), // 10 km/h
                deg: None,
                gust: None,
            }),
            name: Some("Hanoi".to_string()),
            dt: None,
        }
    }

    pub fn air_pollution(&self) -> AirPollutionResponse {
        AirPollutionResponse {
            list: vec![AirPollutionEntry {
                dt: None,
                main: Some(AirQualityIndex { aqi: Some(5) }),
                components: AirComponents {
                    pm2_5: Some(150.0),
                    ..AirComponents::default()
                },
            }],
        }
    }

    pub fn reading(&self) -> Result<Reading, PayloadError> {
        Reading::from_responses(&self.current_weather(), &self.air_pollution())
    }
}

impl Default for SampleWeatherSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::round_display;

    #[test]
    fn test_sample_reading() {
        let reading = SampleWeatherSource::new().reading().unwrap();

        assert_eq!(reading.temperature_c, 26.0);
        assert_eq!(reading.humidity_pct, 48.0);
        assert_eq!(round_display(reading.wind_speed_kmh), 10);
        assert_eq!(reading.condition_code, 800);
        assert_eq!(reading.description, "CLEAR SKY");
        assert_eq!(reading.pm25, 150.0);
    }

    #[test]
    fn test_sample_air_pollution_payload() {
        let response = SampleWeatherSource::new().air_pollution();

        assert_eq!(response.list.len(), 1);
        let entry = &response.list[0];
        assert_eq!(entry.main.as_ref().and_then(|m| m.aqi), Some(5));
        assert_eq!(entry.components.pm2_5, Some(150.0));
        assert_eq!(entry.components.pm10, None);
    }
}
