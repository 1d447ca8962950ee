use crate::rules::{AqiActionRule, RuleSet, WeatherActionRule};
use crate::weather::types::ReadingError;

/// At or above this temperature, hydration advice replaces mask advice.
pub const HEAT_OVERRIDE_MIN_TEMP_C: f64 = 30.0;
/// Tiers whose upper bound exceeds this are too severe for the heat override.
pub const HEAT_OVERRIDE_MAX_PM25: f64 = 100.0;

pub const HEAT_OVERRIDE_ACTION: &str = "Drink water";
pub const HEAT_OVERRIDE_ICON_KEY: &str = "water";

impl RuleSet {
    /// First weather rule matching the reading, falling back to the catch-all.
    pub fn resolve_weather_action(
        &self,
        temperature_c: f64,
        humidity_pct: f64,
        condition_code: i32,
    ) -> &WeatherActionRule {
        self.weather_rules()
            .iter()
            .find(|rule| rule.matches(temperature_c, humidity_pct, condition_code))
            .unwrap_or_else(|| self.weather_catch_all())
    }

    pub fn resolve_aqi_action(&self, pm25: f64) -> Result<&AqiActionRule, ReadingError> {
        if !pm25.is_finite() {
            return Err(ReadingError::NonFinite { field: "pm25", value: pm25 });
        }
        if pm25 < 0.0 {
            return Err(ReadingError::NegativePm25(pm25));
        }

        Ok(self
            .aqi_rules()
            .iter()
            .find(|tier| tier.covers(pm25))
            .unwrap_or_else(|| self.top_aqi_tier()))
    }
}

pub fn heat_override_applies(tier: &AqiActionRule, temperature_c: f64) -> bool {
    temperature_c >= HEAT_OVERRIDE_MIN_TEMP_C
        && tier.max.is_some_and(|max| max <= HEAT_OVERRIDE_MAX_PM25)
}

/// Swap the tier's action for hydration advice when it is hot and the air is not severe.
/// Status and color always come from the tier itself.
pub fn adjust_for_heat(tier: &AqiActionRule, temperature_c: f64) -> AqiActionRule {
    if heat_override_applies(tier, temperature_c) {
        AqiActionRule {
            action: HEAT_OVERRIDE_ACTION.to_string(),
            icon_key: HEAT_OVERRIDE_ICON_KEY.to_string(),
            ..tier.clone()
        }
    } else {
        tier.clone()
    }
}
