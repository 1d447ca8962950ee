use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("{0} rule table is empty")]
    EmptyTable(&'static str),
    #[error("last weather rule must be an unconditional catch-all, found {0:?}")]
    MissingCatchAll(String),
    #[error("weather rule {index} has inverted bounds ({field})")]
    InvertedBounds { index: usize, field: &'static str },
    #[error("AQI tier {index} threshold {value} is not finite")]
    NonFiniteThreshold { index: usize, value: f64 },
    #[error("AQI tier {index} threshold must be greater than the previous tier")]
    ThresholdNotIncreasing { index: usize },
    #[error("only the last AQI tier may be unbounded (tier {index})")]
    UnboundedTierNotLast { index: usize },
    #[error("last AQI tier must be unbounded")]
    BoundedLastTier,
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse rules file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One row of the weather table. Absent bounds are unbounded, bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherActionRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_codes: Option<Vec<i32>>,
    pub action: String,
    pub condition: String,
    pub icon_key: String,
}

impl WeatherActionRule {
    pub fn matches(&self, temperature_c: f64, humidity_pct: f64, condition_code: i32) -> bool {
        within(temperature_c, self.temp_min, self.temp_max)
            && within(humidity_pct, self.humidity_min, self.humidity_max)
            && self
                .condition_codes
                .as_ref()
                .map_or(true, |codes| codes.contains(&condition_code))
    }

    pub fn is_catch_all(&self) -> bool {
        self.temp_min.is_none()
            && self.temp_max.is_none()
            && self.humidity_min.is_none()
            && self.humidity_max.is_none()
            && self.condition_codes.is_none()
    }
}

// NaN fails every bounded comparison, so it only ever reaches unbounded rules.
fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// One AQI severity tier; `max: None` is the open-ended top tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiActionRule {
    #[serde(default)]
    pub max: Option<f64>,
    pub status: String,
    pub action: String,
    pub icon_key: String,
    pub color: String,
}

impl AqiActionRule {
    pub fn covers(&self, pm25: f64) -> bool {
        self.max.map_or(true, |max| pm25 <= max)
    }
}

/// Both rule tables, validated on construction.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSet {
    weather: Vec<WeatherActionRule>,
    aqi: Vec<AqiActionRule>,
}

#[derive(Deserialize)]
struct RuleSetFile {
    weather: Vec<WeatherActionRule>,
    aqi: Vec<AqiActionRule>,
}

impl RuleSet {
    pub fn new(weather: Vec<WeatherActionRule>, aqi: Vec<AqiActionRule>) -> Result<Self, RuleError> {
        validate_weather_rules(&weather)?;
        validate_aqi_rules(&aqi)?;
        Ok(Self { weather, aqi })
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleError> {
        let file: RuleSetFile = serde_json::from_str(json)?;
        Self::new(file.weather, file.aqi)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn weather_rules(&self) -> &[WeatherActionRule] {
        &self.weather
    }

    pub fn aqi_rules(&self) -> &[AqiActionRule] {
        &self.aqi
    }

    // Validation guarantees both tables are non-empty.
    pub(crate) fn weather_catch_all(&self) -> &WeatherActionRule {
        &self.weather[self.weather.len() - 1]
    }

    pub(crate) fn top_aqi_tier(&self) -> &AqiActionRule {
        &self.aqi[self.aqi.len() - 1]
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            weather: default_weather_rules(),
            aqi: default_aqi_rules(),
        }
    }
}

fn validate_weather_rules(rules: &[WeatherActionRule]) -> Result<(), RuleError> {
    let last = rules.last().ok_or(RuleError::EmptyTable("weather"))?;
    if !last.is_catch_all() {
        return Err(RuleError::MissingCatchAll(last.condition.clone()));
    }

    for (index, rule) in rules.iter().enumerate() {
        if let (Some(min), Some(max)) = (rule.temp_min, rule.temp_max) {
            if min > max {
                return Err(RuleError::InvertedBounds { index, field: "temperature" });
            }
        }
        if let (Some(min), Some(max)) = (rule.humidity_min, rule.humidity_max) {
            if min > max {
                return Err(RuleError::InvertedBounds { index, field: "humidity" });
            }
        }
    }

    Ok(())
}

fn validate_aqi_rules(rules: &[AqiActionRule]) -> Result<(), RuleError> {
    if rules.is_empty() {
        return Err(RuleError::EmptyTable("aqi"));
    }

    let last_index = rules.len() - 1;
    let mut previous: Option<f64> = None;

    for (index, rule) in rules.iter().enumerate() {
        match rule.max {
            Some(value) if !value.is_finite() => {
                return Err(RuleError::NonFiniteThreshold { index, value });
            }
            Some(value) => {
                if index == last_index {
                    return Err(RuleError::BoundedLastTier);
                }
                if previous.is_some_and(|prev| value <= prev) {
                    return Err(RuleError::ThresholdNotIncreasing { index });
                }
                previous = Some(value);
            }
            None if index != last_index => {
                return Err(RuleError::UnboundedTierNotLast { index });
            }
            None => {}
        }
    }

    Ok(())
}

const SNOW_CODES: &[i32] = &[511, 600, 601, 602, 611, 612, 613, 615, 616, 620, 621, 622];
const CLEAR_AND_CLOUD_CODES: &[i32] = &[800, 801, 802, 803, 804];
const THUNDERSTORM_CODES: &[i32] = &[200, 201, 202, 210, 211, 212, 221, 230, 231, 232];
const HEAVY_RAIN_CODES: &[i32] = &[502, 503, 504, 522];
const RAIN_CODES: &[i32] = &[300, 301, 302, 310, 311, 312, 313, 314, 321, 500, 501, 520, 521, 531];
const HAZE_CODES: &[i32] = &[701, 711, 721, 741];
const SUNNY_CODES: &[i32] = &[800, 801];

struct Bounds {
    temp: (Option<f64>, Option<f64>),
    humidity: (Option<f64>, Option<f64>),
    codes: Option<&'static [i32]>,
}

const ANY: Bounds = Bounds { temp: (None, None), humidity: (None, None), codes: None };

fn rule(bounds: Bounds, action: &str, condition: &str, icon_key: &str) -> WeatherActionRule {
    WeatherActionRule {
        temp_min: bounds.temp.0,
        temp_max: bounds.temp.1,
        humidity_min: bounds.humidity.0,
        humidity_max: bounds.humidity.1,
        condition_codes: bounds.codes.map(<[i32]>::to_vec),
        action: action.to_string(),
        condition: condition.to_string(),
        icon_key: icon_key.to_string(),
    }
}

/// Ordered weather table. Earlier rules take priority over later overlapping ones.
pub fn default_weather_rules() -> Vec<WeatherActionRule> {
    let cold = |max: f64, codes| Bounds { temp: (None, Some(max)), humidity: (Some(0.0), None), codes };
    let hot = |min: f64, humidity| Bounds { temp: (Some(min), None), humidity, codes: None };
    let mild = |humidity| Bounds { temp: (Some(15.0), Some(30.0)), humidity, codes: None };
    let coded = |codes| Bounds { codes: Some(codes), ..ANY };

    vec![
        rule(cold(5.0, Some(SNOW_CODES)), "Stay warm", "Severe Winter", "cold"),
        rule(cold(5.0, Some(CLEAR_AND_CLOUD_CODES)), "Stay warm", "Freezing Cold", "cold"),
        rule(cold(10.0, None), "Warm tea", "Cold", "tea"),
        rule(
            Bounds { temp: (None, Some(15.0)), humidity: (Some(70.0), None), codes: None },
            "Wear layers",
            "Chilly & Damp",
            "warm",
        ),
        rule(hot(35.0, (Some(50.0), None)), "Stay hydrated", "Very Hot", "sunglasses"),
        rule(hot(30.0, (Some(75.0), None)), "Drink water", "Extreme Humidity", "sunglasses"),
        rule(hot(30.0, (Some(50.0), None)), "Stay cool", "Very Hot", "sunglasses"),
        rule(hot(30.0, (None, Some(40.0))), "Hydrate well", "Hot & Dry", "sunglasses"),
        rule(coded(THUNDERSTORM_CODES), "Take shelter", "Thunderstorm", "umbrella"),
        rule(coded(HEAVY_RAIN_CODES), "Heavy rain", "Heavy Rain", "umbrella"),
        rule(coded(RAIN_CODES), "Bring umbrella", "Rain/Drizzle", "umbrella"),
        rule(coded(HAZE_CODES), "Wear mask", "Mist/Fog/Haze", "haze"),
        rule(
            Bounds {
                temp: (Some(25.0), Some(35.0)),
                humidity: (None, Some(40.0)),
                codes: Some(SUNNY_CODES),
            },
            "Great day",
            "Sunny",
            "sunglasses",
        ),
        rule(mild((None, Some(40.0))), "Enjoy outdoors", "Pleasant & Dry", "sunny"),
        rule(mild((Some(70.0), None)), "Light walk", "Warm & Humid", "sunny"),
        rule(mild((Some(41.0), Some(69.0))), "Perfect weather", "Ideal Comfort", "sunny"),
        rule(coded(CLEAR_AND_CLOUD_CODES), "Check UV", "Clear/Cloudy", "sunny"),
        rule(ANY, "Enjoy day", "Comfortable", "sunny"),
    ]
}

/// PM2.5 tiers, ascending by inclusive upper bound.
pub fn default_aqi_rules() -> Vec<AqiActionRule> {
    let tier = |max: Option<f64>, status: &str, action: &str, icon_key: &str, color: &str| AqiActionRule {
        max,
        status: status.to_string(),
        action: action.to_string(),
        icon_key: icon_key.to_string(),
        color: color.to_string(),
    };

    vec![
        tier(Some(12.0), "GOOD", "Fresh air", "smile", "#00e400"),
        tier(Some(35.4), "MODERATE", "Limit exposure", "breeze", "#ffff00"),
        tier(Some(55.4), "UNHEALTHY (SG)", "Mask up", "mask", "#ff7e00"),
        tier(Some(150.4), "UNHEALTHY", "Wear mask", "mask", "#ff0000"),
        tier(Some(250.4), "VERY UNHEALTHY", "Stay indoors", "home", "#8f3f97"),
        tier(None, "HAZARDOUS", "Avoid outdoors", "mask", "#7e0023"),
    ]
}
