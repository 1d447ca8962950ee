use chrono::{DateTime, TimeZone};

/// Convert wind speed from m/s to km/h
pub fn ms_to_kmh(ms: f64) -> f64 {
    ms * 3.6
}

/// Round to the nearest whole number, halves away from zero
pub fn round_display(value: f64) -> i64 {
    value.round() as i64
}

/// Validate latitude and longitude coordinates
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Invalid latitude: {}. Must be between -90 and 90", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Invalid longitude: {}. Must be between -180 and 180", lon));
    }
    Ok(())
}

/// Parse timezone string and validate
pub fn parse_timezone(tz_str: &str) -> Result<chrono_tz::Tz, String> {
    tz_str
        .parse::<chrono_tz::Tz>()
        .map_err(|_| format!("Invalid timezone: {}", tz_str))
}

/// Format a date as "NOV 24, 2025"
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%b %-d, %Y").to_string().to_uppercase()
}

/// Format a time as 24-hour "HH:MM"
pub fn format_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%H:%M").to_string()
}

/// Keep the first `count` words, dropping punctuation left dangling at the cut
pub fn first_words(text: &str, count: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= count {
        return words.join(" ");
    }

    words[..count]
        .join(" ")
        .trim_end_matches(|c: char| ",.;:".contains(c))
        .to_string()
}

/// Capitalize the first letter of every word, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = c.is_whitespace() || c == '/' || c == '(';
        }
    }

    out
}

/// Escape text for interpolation into HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
