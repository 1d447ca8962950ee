use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::recommend::adjust_for_heat;
use crate::rules::RuleSet;
use crate::utils::{first_words, format_date, format_time, round_display, title_case};
use crate::weather::types::{Reading, ReadingError};

/// How much of an action's text reaches the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStyle {
    #[default]
    Full,
    FirstTwoWords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextCase {
    #[default]
    Upper,
    Title,
}

impl FromStr for ActionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(ActionStyle::Full),
            "two-words" | "first-two-words" => Ok(ActionStyle::FirstTwoWords),
            other => Err(format!("unknown action style {:?} (expected full or two-words)", other)),
        }
    }
}

impl FromStr for TextCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upper" => Ok(TextCase::Upper),
            "title" => Ok(TextCase::Title),
            other => Err(format!("unknown text case {:?} (expected upper or title)", other)),
        }
    }
}

impl fmt::Display for ActionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStyle::Full => write!(f, "full"),
            ActionStyle::FirstTwoWords => write!(f, "two-words"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PresentationOptions {
    pub action_style: ActionStyle,
    pub text_case: TextCase,
}

impl PresentationOptions {
    fn label(&self, text: &str) -> String {
        match self.text_case {
            TextCase::Upper => text.to_uppercase(),
            TextCase::Title => title_case(text),
        }
    }

    fn action(&self, text: &str) -> String {
        let text = match self.action_style {
            ActionStyle::Full => text.to_string(),
            ActionStyle::FirstTwoWords => first_words(text, 2),
        };
        self.label(&text)
    }
}

/// Static text shown alongside the computed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayContext {
    pub location: String,
    pub quote: String,
}

/// Display-ready values for a single render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationValues {
    pub date: String,
    pub time: String,
    pub location: String,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub condition: String,
    pub description: String,
    pub weather_action: String,
    pub weather_icon_key: String,
    pub aqi: String,
    pub aqi_status: String,
    pub aqi_action: String,
    pub aqi_icon_key: String,
    pub aqi_color: String,
    pub quote: String,
}

/// Resolve both rule tables for `reading` and flatten the result into display strings.
///
/// Classification runs on the rounded temperature, humidity and PM2.5 so the
/// shown numbers always agree with the chosen rules. `now` is only used for
/// the date and time fields.
pub fn build_presentation(
    reading: &Reading,
    rules: &RuleSet,
    context: &DisplayContext,
    options: PresentationOptions,
    now: DateTime<Tz>,
) -> Result<PresentationValues, ReadingError> {
    reading.validate()?;

    let temperature = round_display(reading.temperature_c);
    let feels_like = round_display(reading.feels_like_c);
    let humidity = round_display(reading.humidity_pct);
    let wind = round_display(reading.wind_speed_kmh);
    let pm25 = round_display(reading.pm25);

    let weather_rule =
        rules.resolve_weather_action(temperature as f64, humidity as f64, reading.condition_code);
    let base_tier = rules.resolve_aqi_action(pm25 as f64)?;
    let aqi_rule = adjust_for_heat(base_tier, temperature as f64);

    Ok(PresentationValues {
        date: format_date(&now),
        time: format_time(&now),
        location: context.location.clone(),
        temperature: temperature.to_string(),
        feels_like: feels_like.to_string(),
        humidity: humidity.to_string(),
        wind: wind.to_string(),
        condition: options.label(&weather_rule.condition),
        description: reading.description.clone(),
        weather_action: options.action(&weather_rule.action),
        weather_icon_key: weather_rule.icon_key.clone(),
        aqi: pm25.to_string(),
        aqi_status: aqi_rule.status,
        aqi_action: options.action(&aqi_rule.action),
        aqi_icon_key: aqi_rule.icon_key,
        aqi_color: aqi_rule.color,
        quote: context.quote.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{default_aqi_rules, WeatherActionRule};
    use chrono::TimeZone;

    fn reading(temp: f64, humidity: f64, code: i32, pm25: f64) -> Reading {
        Reading {
            temperature_c: temp,
            feels_like_c: temp + 1.0,
            humidity_pct: humidity,
            wind_speed_kmh: 10.0,
            condition_code: code,
            description: "TEST SKY".to_string(),
            pm25,
        }
    }

    fn context() -> DisplayContext {
        DisplayContext {
            location: "HANOI, VIETNAM".to_string(),
            quote: "A quiet sea never made a skilled sailor.".to_string(),
        }
    }

    fn clock() -> DateTime<Tz> {
        chrono_tz::Asia::Ho_Chi_Minh
            .with_ymd_and_hms(2025, 11, 24, 14, 30, 0)
            .unwrap()
    }

    fn build(reading: &Reading) -> PresentationValues {
        build_presentation(reading, &RuleSet::default(), &context(), PresentationOptions::default(), clock())
            .unwrap()
    }

    #[test]
    fn test_comfortable_clear_day() {
        let values = build(&reading(26.0, 48.0, 800, 15.0));

        assert_eq!(values.condition, "IDEAL COMFORT");
        assert_eq!(values.weather_action, "PERFECT WEATHER");
        assert_eq!(values.weather_icon_key, "sunny");
        assert_eq!(values.aqi_status, "MODERATE");
        assert_eq!(values.aqi_action, "LIMIT EXPOSURE");
        assert_eq!(values.aqi_icon_key, "breeze");
        assert_eq!(values.aqi_color, "#ffff00");
        assert_eq!(values.temperature, "26");
        assert_eq!(values.feels_like, "27");
        assert_eq!(values.humidity, "48");
        assert_eq!(values.wind, "10");
        assert_eq!(values.aqi, "15");
        assert_eq!(values.date, "NOV 24, 2025");
        assert_eq!(values.time, "14:30");
        assert_eq!(values.location, "HANOI, VIETNAM");
        assert_eq!(values.description, "TEST SKY");
    }

    #[test]
    fn test_hot_day_swaps_mask_for_water() {
        let values = build(&reading(32.0, 60.0, 801, 40.0));

        assert_eq!(values.condition, "VERY HOT");
        assert_eq!(values.aqi_status, "UNHEALTHY (SG)");
        assert_eq!(values.aqi_action, "DRINK WATER");
        assert_eq!(values.aqi_icon_key, "water");
        assert_eq!(values.aqi_color, "#ff7e00");
    }

    #[test]
    fn test_snow_reports_severe_winter() {
        let values = build(&reading(2.0, 80.0, 601, 5.0));

        assert_eq!(values.condition, "SEVERE WINTER");
        assert_eq!(values.weather_action, "STAY WARM");
        assert_eq!(values.aqi_status, "GOOD");
        assert_eq!(values.aqi_action, "FRESH AIR");
    }

    #[test]
    fn test_heat_check_uses_rounded_temperature() {
        // 29.6 displays as 30, so the override fires with it
        let values = build(&reading(29.6, 60.0, 800, 20.0));
        assert_eq!(values.temperature, "30");
        assert_eq!(values.aqi_action, "DRINK WATER");

        let values = build(&reading(29.4, 60.0, 800, 20.0));
        assert_eq!(values.temperature, "29");
        assert_eq!(values.aqi_action, "LIMIT EXPOSURE");
    }

    #[test]
    fn test_pm25_rounded_before_classification() {
        // 12.4 rounds to 12, which is still GOOD
        let values = build(&reading(20.0, 50.0, 800, 12.4));
        assert_eq!(values.aqi, "12");
        assert_eq!(values.aqi_status, "GOOD");

        let values = build(&reading(20.0, 50.0, 800, 12.5));
        assert_eq!(values.aqi, "13");
        assert_eq!(values.aqi_status, "MODERATE");
    }

    #[test]
    fn test_build_is_idempotent() {
        let input = reading(18.3, 72.0, 500, 88.8);
        let first = build(&input);
        let second = build(&input);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_invalid_readings_fail_fast() {
        let rules = RuleSet::default();

        let negative = reading(20.0, 50.0, 800, -1.0);
        let err = build_presentation(&negative, &rules, &context(), PresentationOptions::default(), clock());
        assert_eq!(err, Err(ReadingError::NegativePm25(-1.0)));

        let nan = reading(f64::NAN, 50.0, 800, 10.0);
        let err = build_presentation(&nan, &rules, &context(), PresentationOptions::default(), clock());
        assert!(matches!(err, Err(ReadingError::NonFinite { field: "temperature_c", .. })));
    }

    #[test]
    fn test_two_word_title_case_options() {
        let long_actions = vec![
            WeatherActionRule {
                temp_min: None,
                temp_max: None,
                humidity_min: None,
                humidity_max: None,
                condition_codes: None,
                action: "Wear sunglasses, stay hydrated.".to_string(),
                condition: "HOT & DRY".to_string(),
                icon_key: "sunglasses".to_string(),
            },
        ];
        let rules = RuleSet::new(long_actions, default_aqi_rules()).unwrap();
        let options = PresentationOptions {
            action_style: ActionStyle::FirstTwoWords,
            text_case: TextCase::Title,
        };

        let values =
            build_presentation(&reading(20.0, 30.0, 800, 100.0), &rules, &context(), options, clock()).unwrap();

        assert_eq!(values.condition, "Hot & Dry");
        assert_eq!(values.weather_action, "Wear Sunglasses");
        assert_eq!(values.aqi_action, "Wear Mask");
        // Severity labels are shown as configured
        assert_eq!(values.aqi_status, "UNHEALTHY");
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!("full".parse::<ActionStyle>(), Ok(ActionStyle::Full));
        assert_eq!("Two-Words".parse::<ActionStyle>(), Ok(ActionStyle::FirstTwoWords));
        assert!("three-words".parse::<ActionStyle>().is_err());
        assert_eq!("TITLE".parse::<TextCase>(), Ok(TextCase::Title));
        assert!("lower".parse::<TextCase>().is_err());
        assert_eq!(ActionStyle::FirstTwoWords.to_string(), "two-words");
    }
}
