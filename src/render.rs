use crate::presentation::PresentationValues;
use crate::utils::escape_html;

pub fn placeholders(values: &PresentationValues) -> [(&'static str, &str); 21] {
    [
        ("{{DATE}}", values.date.as_str()),
        ("{{TIME}}", values.time.as_str()),
        ("{{LOCATION}}", values.location.as_str()),
        ("{{TEMPERATURE}}", values.temperature.as_str()),
        ("{{FEELS_LIKE}}", values.feels_like.as_str()),
        ("{{HUMIDITY}}", values.humidity.as_str()),
        ("{{WIND}}", values.wind.as_str()),
        ("{{CONDITION}}", values.condition.as_str()),
        ("{{DESCRIPTION}}", values.description.as_str()),
        ("{{WEATHER_ACTION}}", values.weather_action.as_str()),
        ("{{WEATHER_ICON}}", values.weather_icon_key.as_str()),
        ("{{AQI}}", values.aqi.as_str()),
        ("{{AQI_STATUS}}", values.aqi_status.as_str()),
        ("{{AQI_ACTION}}", values.aqi_action.as_str()),
        ("{{AQI_ICON}}", values.aqi_icon_key.as_str()),
        ("{{AQI_COLOR}}", values.aqi_color.as_str()),
        ("{{QUOTE}}", values.quote.as_str()),
        // Names used by older dashboard templates
        ("{{AQI_VALUE}}", values.aqi.as_str()),
        ("{{WIND_SPEED}}", values.wind.as_str()),
        ("{{HERO_ACTION}}", values.weather_action.as_str()),
        ("{{LAST_UPDATED}}", values.time.as_str()),
    ]
}

/// Fill every `{{PLACEHOLDER}}` in `template` with its HTML-escaped value.
/// Unknown placeholders are left untouched.
pub fn render_template(template: &str, values: &PresentationValues) -> String {
    placeholders(values)
        .iter()
        .fold(template.to_string(), |html, (placeholder, value)| {
            html.replace(*placeholder, &escape_html(value))
        })
}
