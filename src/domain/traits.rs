//! # Domain Traits
//!
//! Abstract interfaces for the collaborators the bot talks to (chat network, weather service).
//! Allows for pluggable implementations in the Infrastructure layer.

use crate::domain::error::BotResult;
use async_trait::async_trait;

/// Abstract interface for a chat network (IRC, Matrix, ...)
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Join a channel (or room)
    async fn join(&self, channel: &str) -> Result<(), String>;

    /// Send a message to a channel
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), String>;
}

/// Abstract interface for the text weather service
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the raw conditions text for a city.
    /// Non-success statuses are reported as `BotError::Provider`.
    async fn fetch_conditions_text(&self, city: &str) -> BotResult<String>;
}
