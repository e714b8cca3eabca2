//! Recording chat transport and scripted weather provider for handler tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::{ChatTransport, WeatherProvider};
use crate::domain::types::ChatEvent;

#[derive(Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<(String, String)>>,
    pub joined: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn last(&self) -> Option<(String, String)> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn join(&self, channel: &str) -> Result<(), String> {
        self.joined.lock().unwrap().push(channel.to_string());
        Ok(())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

pub enum MockWeather {
    Reply(String),
    Fail(String),
    Hang(Duration),
}

#[async_trait]
impl WeatherProvider for MockWeather {
    async fn fetch_conditions_text(&self, _city: &str) -> BotResult<String> {
        match self {
            MockWeather::Reply(body) => Ok(body.clone()),
            MockWeather::Fail(reason) => Err(BotError::Provider(reason.clone())),
            MockWeather::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(String::new())
            }
        }
    }
}

pub fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

pub fn event(user: &str, text: &str, at: DateTime<Utc>) -> ChatEvent {
    ChatEvent {
        channel: "#itsk".to_string(),
        user: user.to_string(),
        text: text.to_string(),
        timestamp: at,
    }
}
