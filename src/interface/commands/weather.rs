//! # Weather Commands
//!
//! Handles `.addweather ~<city>~` and `.weather`.
//! The provider call is bounded by a timeout; any provider failure skips the reply.

use std::time::Duration;

use crate::application::weather_parser;
use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::{ChatTransport, WeatherProvider};
use crate::domain::types::ChatEvent;
use crate::infrastructure::store::RecordStore;
use crate::interface::commands::reply;
use crate::strings::messages;

const CITY_DELIMITER: char = '~';

/// First non-empty segment bracketed by two delimiters.
pub fn parse_city(args: &str) -> Option<String> {
    let segments: Vec<&str> = args.split(CITY_DELIMITER).collect();
    if segments.len() < 3 {
        return None;
    }
    segments[1..segments.len() - 1]
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

pub async fn handle_add_weather(
    store: &RecordStore,
    chat: &dyn ChatTransport,
    event: &ChatEvent,
    cmd: &str,
    args: &str,
) -> BotResult<()> {
    let city = parse_city(args).ok_or_else(|| BotError::MalformedInput(messages::add_weather_usage(cmd)))?;

    store.upsert_weather_location(&event.user, &city)?;
    tracing::info!(user = %event.user, city = %city, "Weather location saved");
    reply(chat, &event.channel, messages::LOCATION_SAVED).await;
    Ok(())
}

pub async fn handle_fetch_weather(
    store: &RecordStore,
    provider: &dyn WeatherProvider,
    timeout: Duration,
    chat: &dyn ChatTransport,
    event: &ChatEvent,
    add_cmd: &str,
) -> BotResult<()> {
    let location = match store.get_weather_location(&event.user) {
        Ok(location) => location,
        Err(BotError::NotFound(_)) => {
            reply(
                chat,
                &event.channel,
                &messages::weather_not_configured(&event.user, add_cmd),
            )
            .await;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let raw = tokio::time::timeout(timeout, provider.fetch_conditions_text(&location.city))
        .await
        .map_err(|_| {
            BotError::Provider(format!(
                "no answer for {} within {}s",
                location.city,
                timeout.as_secs_f32()
            ))
        })??;

    let report = weather_parser::parse(&raw);
    if report.condition.is_empty() && report.temperature.is_empty() {
        tracing::warn!(city = %location.city, "Weather text did not match the expected layout");
    }

    reply(
        chat,
        &event.channel,
        &messages::weather_report(
            &location.username,
            &report.condition,
            &report.temperature_display(),
            &location.city,
        ),
    )
    .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TimestampPrecision;
    use crate::test_support::{MockTransport, MockWeather, event, ts};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn store() -> RecordStore {
        RecordStore::open_in_memory(TimestampPrecision::Day).unwrap()
    }

    #[test]
    fn test_parse_city() {
        assert_eq!(parse_city("~San Francisco~").as_deref(), Some("San Francisco"));
        assert_eq!(parse_city("please ~Oslo~ thanks").as_deref(), Some("Oslo"));
        assert_eq!(parse_city("~~Lima~").as_deref(), Some("Lima"));
        assert_eq!(parse_city("~Paris"), None);
        assert_eq!(parse_city("Paris"), None);
        assert_eq!(parse_city("~  ~"), None);
    }

    #[tokio::test]
    async fn test_add_weather_upserts() {
        let store = store();
        let chat = MockTransport::default();
        let at = ts(2024, 1, 1, 0, 0, 0);

        handle_add_weather(&store, &chat, &event("alice", "", at), ".addweather", "~Paris~")
            .await
            .unwrap();
        handle_add_weather(&store, &chat, &event("alice", "", at), ".addweather", "~Berlin~")
            .await
            .unwrap();

        assert_eq!(store.get_weather_location("alice").unwrap().city, "Berlin");
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[0], messages::LOCATION_SAVED);
    }

    #[tokio::test]
    async fn test_add_weather_without_second_delimiter_writes_nothing() {
        let store = store();
        let chat = MockTransport::default();
        let result = handle_add_weather(
            &store,
            &chat,
            &event("alice", "", ts(2024, 1, 1, 0, 0, 0)),
            ".addweather",
            "~Paris",
        )
        .await;

        match result {
            Err(BotError::MalformedInput(usage)) => assert!(usage.contains(".addweather ~San Francisco~")),
            other => panic!("expected usage error, got {other:?}"),
        }
        assert!(matches!(store.get_weather_location("alice"), Err(BotError::NotFound(_))));
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_weather_without_location_hints() {
        let store = store();
        let chat = MockTransport::default();
        let provider = MockWeather::Reply(String::new());
        handle_fetch_weather(&store, &provider, TIMEOUT, &chat, &event("bob", ".weather", ts(2024, 1, 1, 0, 0, 0)), ".addweather")
            .await
            .unwrap();
        let text = chat.last().unwrap().1;
        assert!(text.starts_with("bob It doesn't look like you have configured a location"));
        assert!(text.contains(".addweather ~San Francisco~"));
    }

    #[tokio::test]
    async fn test_fetch_weather_reports_conditions() {
        let store = store();
        store.upsert_weather_location("alice", "Oslo").unwrap();
        let chat = MockTransport::default();
        let provider = MockWeather::Reply("<pre>Partly cloudy 16 °C</pre>".to_string());
        handle_fetch_weather(&store, &provider, TIMEOUT, &chat, &event("alice", ".weather", ts(2024, 1, 1, 0, 0, 0)), ".addweather")
            .await
            .unwrap();
        assert_eq!(
            chat.last().unwrap().1,
            "alice - The current weather condition is Partly cloudy and 16 C in Oslo"
        );
    }

    #[tokio::test]
    async fn test_provider_failure_skips_reply() {
        let store = store();
        store.upsert_weather_location("alice", "Oslo").unwrap();
        let chat = MockTransport::default();
        let provider = MockWeather::Fail("HTTP 503".to_string());
        let result = handle_fetch_weather(&store, &provider, TIMEOUT, &chat, &event("alice", ".weather", ts(2024, 1, 1, 0, 0, 0)), ".addweather").await;
        assert!(matches!(result, Err(BotError::Provider(_))));
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn test_provider_timeout_is_a_provider_error() {
        let store = store();
        store.upsert_weather_location("alice", "Oslo").unwrap();
        let chat = MockTransport::default();
        let provider = MockWeather::Hang(Duration::from_secs(30));
        let result = handle_fetch_weather(
            &store,
            &provider,
            Duration::from_millis(50),
            &chat,
            &event("alice", ".weather", ts(2024, 1, 1, 0, 0, 0)),
            ".addweather",
        )
        .await;
        assert!(matches!(result, Err(BotError::Provider(_))));
        assert!(chat.messages().is_empty());
    }
}
