use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::presentation::{ActionStyle, PresentationOptions, TextCase};
use crate::utils::{parse_timezone, validate_coordinates};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub openweather_weather_path: String,
    pub openweather_air_pollution_path: String,
    pub lat: f64,
    pub lon: f64,
    pub location_label: String,
    pub quote: String,
    pub app_timezone: String,
    pub refresh_interval_minutes: u64,
    pub output_dir: PathBuf,
    pub template_file: Option<PathBuf>,
    pub rules_file: Option<PathBuf>,
    pub action_style: ActionStyle,
    pub text_case: TextCase,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openweather_api_key: None,
            openweather_base_url: "https://api.openweathermap.org".to_string(),
            openweather_weather_path: "/data/2.5/weather".to_string(),
            openweather_air_pollution_path: "/data/2.5/air_pollution".to_string(),
            lat: 21.0285,
            lon: 105.8542,
            location_label: "HANOI, VIETNAM".to_string(),
            quote: "A quiet sea never made a skilled sailor.".to_string(),
            app_timezone: "Asia/Ho_Chi_Minh".to_string(),
            refresh_interval_minutes: 15,
            output_dir: PathBuf::from("./dist"),
            template_file: None,
            rules_file: None,
            action_style: ActionStyle::Full,
            text_case: TextCase::Upper,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let config = Config {
            openweather_api_key: env::var("OPENWEATHER_API_KEY")
                .or_else(|_| env::var("WEATHER_API_KEY"))
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or(defaults.openweather_base_url),
            openweather_weather_path: env::var("OPENWEATHER_WEATHER_PATH")
                .unwrap_or(defaults.openweather_weather_path),
            openweather_air_pollution_path: env::var("OPENWEATHER_AIR_POLLUTION_PATH")
                .unwrap_or(defaults.openweather_air_pollution_path),
            lat: parse_var("LOCATION_LAT")?.unwrap_or(defaults.lat),
            lon: parse_var("LOCATION_LON")?.unwrap_or(defaults.lon),
            location_label: env::var("LOCATION_LABEL").unwrap_or(defaults.location_label),
            quote: env::var("DASHBOARD_QUOTE").unwrap_or(defaults.quote),
            app_timezone: env::var("APP_TIMEZONE").unwrap_or(defaults.app_timezone),
            refresh_interval_minutes: parse_var("REFRESH_INTERVAL_MINUTES")?
                .unwrap_or(defaults.refresh_interval_minutes),
            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            template_file: env::var("TEMPLATE_FILE").ok().map(PathBuf::from),
            rules_file: env::var("RULES_FILE").ok().map(PathBuf::from),
            action_style: parse_var("ACTION_STYLE")?.unwrap_or(defaults.action_style),
            text_case: parse_var("TEXT_CASE")?.unwrap_or(defaults.text_case),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_coordinates(self.lat, self.lon).map_err(|e| anyhow::anyhow!(e))?;
        parse_timezone(&self.app_timezone).map_err(|e| anyhow::anyhow!(e))?;
        if self.refresh_interval_minutes == 0 {
            anyhow::bail!("REFRESH_INTERVAL_MINUTES must be at least 1");
        }
        Ok(())
    }

    pub fn timezone(&self) -> anyhow::Result<chrono_tz::Tz> {
        parse_timezone(&self.app_timezone).map_err(|e| anyhow::anyhow!(e))
    }

    pub fn presentation_options(&self) -> PresentationOptions {
        PresentationOptions {
            action_style: self.action_style,
            text_case: self.text_case,
        }
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Ho_Chi_Minh);
        assert_eq!(config.presentation_options(), PresentationOptions::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config { app_timezone: "Nowhere/City".to_string(), ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { lat: -95.0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { refresh_interval_minutes: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_var_reports_variable_name() {
        env::set_var("WEAAQI_TEST_BAD_NUMBER", "not-a-number");
        let err = parse_var::<f64>("WEAAQI_TEST_BAD_NUMBER").unwrap_err();
        assert!(err.to_string().contains("WEAAQI_TEST_BAD_NUMBER"));

        assert_eq!(parse_var::<f64>("WEAAQI_TEST_UNSET_VARIABLE").unwrap(), None);
    }
}
