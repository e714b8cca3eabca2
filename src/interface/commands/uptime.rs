//! # Uptime Command
//!
//! Handles `.uptime`.

use chrono::{DateTime, Utc};

use crate::application::uptime::uptime_diff;
use crate::domain::traits::ChatTransport;
use crate::domain::types::ChatEvent;
use crate::interface::commands::reply;
use crate::strings::messages;

pub async fn handle_uptime(started_at: DateTime<Utc>, chat: &dyn ChatTransport, event: &ChatEvent) {
    let d = uptime_diff(started_at, event.timestamp);
    let msg = messages::uptime(d.years, d.months, d.days, d.hours, d.minutes, d.seconds);
    reply(chat, &event.channel, &msg).await;
}
