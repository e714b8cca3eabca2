//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes usage errors, command replies, and notification templates.

pub const NO_QUOTES: &str = "There are no quotes yet.";
pub const USER_NOT_FOUND: &str = "User Not Found";
pub const LOCATION_SAVED: &str = "You have successfully configured your location!";
pub const STORAGE_UNAVAILABLE: &str = "Sorry, I can't reach my records right now.";

pub fn add_quote_usage(cmd: &str) -> String {
    format!("Unknown syntax - Please use the following syntax: '{cmd} some quoted text'")
}

pub fn quote_added(id: i64) -> String {
    format!("Quote #{id} added.")
}

pub fn quote_line(user: &str, date: &str, text: &str) -> String {
    format!("Quote added by: {user} : On {date} ~ {text}")
}

pub fn add_weather_usage(cmd: &str) -> String {
    format!("Unknown syntax - Please use the following syntax: '{cmd} ~San Francisco~'")
}

pub fn weather_not_configured(user: &str, add_cmd: &str) -> String {
    format!(
        "{user} It doesn't look like you have configured a location - please add a location with command {add_cmd} ~San Francisco~"
    )
}

pub fn weather_report(user: &str, condition: &str, temperature: &str, city: &str) -> String {
    format!("{user} - The current weather condition is {condition} and {temperature} in {city}")
}

pub fn seen_usage(cmd: &str) -> String {
    format!("Unknown syntax - Please use the following syntax: '{cmd} username'")
}

pub fn last_seen(user: &str, date: &str, message: &str) -> String {
    format!("User: {user} was seen on {date} Message: {message}")
}

pub fn uptime(years: i32, months: i32, days: i32, hours: i32, minutes: i32, seconds: i32) -> String {
    format!(
        "I have been running for: {years} years, {months} months, {days} days, {hours} hours, {minutes} minutes, {seconds} seconds."
    )
}
