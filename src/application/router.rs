//! # Command Router
//!
//! Routes incoming chat events to the appropriate command handler (in `interface/commands`).
//! The first whitespace-delimited token is looked up in the configured command table;
//! anything else is archived. Handler failures are logged here and never reach the event loop.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::config::{CommandKind, CommandsConfig};
use crate::domain::error::BotError;
use crate::domain::traits::{ChatTransport, WeatherProvider};
use crate::domain::types::{ChatEvent, InboundEvent};
use crate::infrastructure::store::RecordStore;
use crate::interface::commands;
use crate::strings::{logs, messages};

pub struct CommandRouter {
    store: Arc<RecordStore>,
    weather: Arc<dyn WeatherProvider>,
    weather_timeout: Duration,
    commands: CommandsConfig,
    started_at: DateTime<Utc>,
    join_message: Option<String>,
}

impl CommandRouter {
    pub fn new(
        store: Arc<RecordStore>,
        weather: Arc<dyn WeatherProvider>,
        weather_timeout: Duration,
        commands: CommandsConfig,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            weather,
            weather_timeout,
            commands,
            started_at,
            join_message: None,
        }
    }

    pub fn with_join_message(mut self, message: Option<String>) -> Self {
        self.join_message = message;
        self
    }

    /// Handle one transport event to completion.
    pub async fn handle(&self, chat: &dyn ChatTransport, event: InboundEvent) {
        match event {
            InboundEvent::Message(msg) => self.route(chat, &msg).await,
            InboundEvent::Invite { channel } => {
                tracing::info!("{}", logs::invite_received(&channel));
                if let Err(e) = chat.join(&channel).await {
                    tracing::error!("{}", logs::join_invite_fail(&channel, &e));
                }
            }
            InboundEvent::Joined { channel, user } => {
                if let Some(greeting) = &self.join_message {
                    tracing::debug!(channel = %channel, user = %user, "Greeting join");
                    commands::reply(chat, &channel, greeting).await;
                }
            }
        }
    }

    pub async fn route(&self, chat: &dyn ChatTransport, event: &ChatEvent) {
        let Some(cmd) = event.text.split_whitespace().next() else {
            tracing::debug!(channel = %event.channel, user = %event.user, "Ignoring empty line");
            return;
        };

        let Some(kind) = self.commands.table.get(cmd).copied() else {
            if let Err(e) = commands::archive::handle_archive(&self.store, event) {
                tracing::error!(channel = %event.channel, user = %event.user, error = %e, "Failed to archive message");
            }
            return;
        };

        let args = event.text.trim_start()[cmd.len()..].trim_start();
        tracing::info!(
            "Router dispatching cmd='{}' args='{}' sender='{}'",
            cmd,
            args,
            event.user
        );

        if let Err(e) = self.dispatch(kind, cmd, args, chat, event).await {
            self.report_failure(chat, event, cmd, e).await;
        }
    }

    async fn dispatch(
        &self,
        kind: CommandKind,
        cmd: &str,
        args: &str,
        chat: &dyn ChatTransport,
        event: &ChatEvent,
    ) -> Result<(), BotError> {
        match kind {
            CommandKind::AddQuote => {
                commands::quote::handle_add_quote(&self.store, chat, event, cmd, args).await
            }
            CommandKind::FetchQuote => {
                commands::quote::handle_fetch_quote(&self.store, chat, event).await
            }
            CommandKind::AddWeather => {
                commands::weather::handle_add_weather(&self.store, chat, event, cmd, args).await
            }
            CommandKind::FetchWeather => {
                let add_cmd = self
                    .commands
                    .token_for(CommandKind::AddWeather)
                    .unwrap_or(".addweather");
                commands::weather::handle_fetch_weather(
                    &self.store,
                    self.weather.as_ref(),
                    self.weather_timeout,
                    chat,
                    event,
                    add_cmd,
                )
                .await
            }
            CommandKind::LastSeen => {
                commands::seen::handle_seen(&self.store, chat, event, cmd, args).await
            }
            CommandKind::Uptime => {
                commands::uptime::handle_uptime(self.started_at, chat, event).await;
                Ok(())
            }
        }
    }

    async fn report_failure(&self, chat: &dyn ChatTransport, event: &ChatEvent, cmd: &str, err: BotError) {
        match err {
            BotError::MalformedInput(usage) => {
                tracing::info!(cmd, user = %event.user, "Malformed command");
                commands::reply(chat, &event.channel, &usage).await;
            }
            BotError::NotFound(what) => {
                tracing::info!(cmd, user = %event.user, "Nothing found: {}", what);
            }
            BotError::Storage(e) => {
                tracing::error!(cmd, channel = %event.channel, user = %event.user, error = %e, "Storage failure");
                commands::reply(chat, &event.channel, messages::STORAGE_UNAVAILABLE).await;
            }
            BotError::Provider(e) => {
                tracing::warn!(cmd, channel = %event.channel, user = %event.user, error = %e, "Weather provider failed, skipping reply");
            }
        }
    }
}
