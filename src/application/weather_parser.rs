//! # Weather Text Parser
//!
//! Pulls a condition phrase and a temperature out of the text weather service's
//! plain-text answer.
//!
//! The extraction is tied to the provider's current layout (`... <value> °<unit> ...`
//! inside a `<pre>` block). Anything that does not fit yields empty strings instead of
//! an error, so a layout change upstream degrades the reply rather than the bot.

/// Known condition phrases, checked in this order.
pub const CONDITIONS: &[&str] = &[
    "Clear",
    "Sunny",
    "Haze",
    "Partly cloudy",
    "Cloudy",
    "Overcast",
    "Mist",
    "Patchy rain possible",
    "Patchy snow possible",
    "Patchy sleet possible",
    "Patchy freezing drizzle possible",
    "Thundery outbreaks possible",
    "Blowing snow",
    "Blizzard",
    "Fog",
    "Freezing fog",
    "Patchy light drizzle",
    "Light drizzle",
    "Freezing drizzle",
    "Heavy freezing drizzle",
    "Patchy light rain",
    "Light rain",
    "Moderate rain at times",
    "Moderate rain",
    "Heavy rain at times",
    "Heavy rain",
    "Light freezing rain",
    "Moderate or heavy freezing rain",
    "Light sleet",
    "Moderate or heavy sleet",
    "Patchy light snow",
    "Light snow",
    "Patchy moderate snow",
    "Moderate snow",
    "Patchy heavy snow",
    "Heavy snow",
    "Ice pellets",
    "Light rain shower",
    "Moderate or heavy rain shower",
    "Torrential rain shower",
    "Light sleet showers",
    "Light snow showers",
    "Moderate or heavy sleet showers",
    "Moderate or heavy snow showers",
    "Patchy light rain with thunder",
    "Moderate or heavy rain with thunder",
    "Patchy light snow with thunder",
    "Moderate or heavy snow with thunder",
];

const PRE_OPEN: &str = "<pre>";
const PRE_CLOSE: &str = "</pre>";
const DEGREE: char = '°';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherReport {
    pub condition: String,
    pub temperature: String,
    pub unit: String,
}

impl WeatherReport {
    /// `"<temperature> <unit>"`, e.g. `16 C`.
    pub fn temperature_display(&self) -> String {
        format!("{} {}", self.temperature, self.unit).trim().to_string()
    }
}

pub fn parse(raw: &str) -> WeatherReport {
    let fragment = between_pre_tags(raw);
    let (temperature, unit) = extract_temperature(fragment);
    WeatherReport {
        condition: extract_condition(fragment),
        temperature,
        unit,
    }
}

/// Text strictly between the first `<pre>` and the next `</pre>`.
fn between_pre_tags(raw: &str) -> &str {
    let Some(open) = raw.find(PRE_OPEN) else {
        return "";
    };
    let rest = &raw[open + PRE_OPEN.len()..];
    match rest.find(PRE_CLOSE) {
        Some(close) => &rest[..close],
        None => "",
    }
}

/// Value: between the second space before the degree mark and the character just before it.
/// Unit: the token right after the degree mark, up to the next whitespace.
fn extract_temperature(fragment: &str) -> (String, String) {
    let Some(degree) = fragment.find(DEGREE) else {
        return (String::new(), String::new());
    };

    let before = &fragment[..degree];
    let mut spaces = before.rmatch_indices(' ').map(|(i, _)| i);
    let value = match (spaces.next(), spaces.next()) {
        (Some(_), Some(second)) => before
            .get(second + 1..degree.saturating_sub(1))
            .unwrap_or_default()
            .trim(),
        _ => "",
    };

    let after = &fragment[degree + DEGREE.len_utf8()..];
    let unit = after.split(char::is_whitespace).next().unwrap_or_default();

    (value.to_string(), unit.to_string())
}

/// Every catalog phrase found in the text, concatenated in catalog order without a
/// separator. Multiple matches run together; kept as the service has always answered.
fn extract_condition(fragment: &str) -> String {
    CONDITIONS
        .iter()
        .filter(|phrase| fragment.contains(*phrase))
        .copied()
        .collect()
}
