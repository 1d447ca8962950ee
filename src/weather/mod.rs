pub mod openweather;
pub mod sample;
pub mod types;

use openweather::{OpenWeatherClient, OpenWeatherError};
use sample::SampleWeatherSource;
use types::Reading;

/// Where readings come from for a generation cycle.
pub enum WeatherSource {
    Live(OpenWeatherClient),
    Sample(SampleWeatherSource),
}

impl WeatherSource {
    pub async fn fetch_reading(&self) -> Result<Reading, OpenWeatherError> {
        match self {
            WeatherSource::Live(client) => client.fetch_reading().await,
            WeatherSource::Sample(sample) => Ok(sample.reading()?),
        }
    }

    pub fn is_sample(&self) -> bool {
        matches!(self, WeatherSource::Sample(_))
    }
}
