//! # Domain Types
//!
//! Records owned by the store and the events flowing from a transport into the router.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A stored quotation. Ids are dense from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub id: i64,
    pub username: String,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

/// One user's configured city. At most one per username.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherLocation {
    pub username: String,
    pub city: String,
}

/// An archived chat line that was not a command.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMessage {
    pub id: i64,
    pub channel: String,
    pub username: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// How finely `LoggedMessage::sent_at` is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPrecision {
    #[default]
    Day,
    Second,
}

impl TimestampPrecision {
    /// Truncates a timestamp to this precision, as Unix seconds.
    pub fn truncate(self, at: DateTime<Utc>) -> i64 {
        let secs = at.timestamp();
        match self {
            TimestampPrecision::Day => secs - secs.rem_euclid(86_400),
            TimestampPrecision::Second => secs,
        }
    }

    /// Display format used in replies.
    pub fn date_format(self) -> &'static str {
        match self {
            TimestampPrecision::Day => "%m-%d-%Y",
            TimestampPrecision::Second => "%m-%d-%Y %H:%M:%S",
        }
    }
}

/// A single chat line delivered by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything a transport can hand to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Message(ChatEvent),
    Invite { channel: String },
    Joined { channel: String, user: String },
}
