//! # Weather Provider
//!
//! Implements `WeatherProvider` against wttr.in's plain-text endpoint.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::config::WeatherConfig;
use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::WeatherProvider;

pub struct WttrProvider {
    client: Client,
    base_url: String,
}

impl WttrProvider {
    pub fn new(config: &WeatherConfig) -> BotResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BotError::Provider(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current conditions only, no colours, no city header.
    pub fn url_for(&self, city: &str) -> String {
        format!("{}/~{}?0TQ", self.base_url, city)
    }
}

#[async_trait]
impl WeatherProvider for WttrProvider {
    async fn fetch_conditions_text(&self, city: &str) -> BotResult<String> {
        let url = self.url_for(city);
        tracing::debug!(url = %url, "Requesting weather");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Provider(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Provider(format!("HTTP {} for {}", status, city)));
        }

        response
            .text()
            .await
            .map_err(|e| BotError::Provider(format!("Failed to read response body: {}", e)))
    }
}
