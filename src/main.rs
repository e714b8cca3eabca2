//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: Configuration and Types
//! - Infrastructure: Record store, IRC / Matrix transport, weather provider, log viewer
//! - Application: Router, Logging
//! - Interface: Command Handlers
//!
//! Transports push events into one channel; a single loop drains it, one event at a time.

#![recursion_limit = "256"]

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::router::CommandRouter;
use crate::domain::config::{AppConfig, TransportKind};
use crate::domain::traits::ChatTransport;
use crate::domain::types::InboundEvent;
use crate::infrastructure::irc::IrcService;
use crate::infrastructure::matrix::MatrixService;
use crate::infrastructure::store::RecordStore;
use crate::infrastructure::weather::WttrProvider;
use crate::strings::logs;

const EVENT_QUEUE_DEPTH: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "itsk", about = "Chat bot with quotes, weather, last-seen and a message archive")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "data/config.yaml")]
    config: String,

    /// IRC server to connect to (overrides the config file)
    #[arg(long)]
    server: Option<String>,

    /// IRC server port (overrides the config file)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(server) = cli.server {
        config.transport.irc.server = server;
    }
    if let Some(port) = cli.port {
        config.transport.irc.port = port;
    }

    // 2. Logging Setup
    let _guard = application::logging::init(&config.logging)?;
    tracing::info!("{}", logs::STARTING);
    tracing::info!("{}", logs::config_loaded(&cli.config));

    // 3. Initialize Infrastructure
    let started_at = Utc::now();
    let store = Arc::new(
        RecordStore::open(&config.storage.path, config.storage.timestamp_precision)
            .with_context(|| format!("Failed to open record store at {}", config.storage.path))?,
    );
    tracing::info!("{}", logs::store_opened(&config.storage.path, store.count_quotes()?));

    let weather = Arc::new(WttrProvider::new(&config.weather)?);

    if config.web.enabled {
        let web_config = config.web.clone();
        let web_store = store.clone();
        tokio::spawn(async move {
            if let Err(e) = infrastructure::web::serve(&web_config, web_store).await {
                tracing::error!("Web viewer failed: {:#}", e);
            }
        });
    }

    // 4. Initialize Application Components
    let router = CommandRouter::new(
        store,
        weather,
        Duration::from_secs(config.weather.timeout_secs),
        config.commands.clone(),
        started_at,
    )
    .with_join_message(config.join_message.clone());

    // 5. Transport Setup
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    match config.transport.kind {
        TransportKind::Irc => {
            let (irc, stream) = IrcService::connect(&config.transport.irc).await?;
            let pump = irc.clone();
            tokio::spawn(async move {
                if let Err(e) = pump.pump(stream, tx).await {
                    tracing::error!("IRC connection failed: {:#}", e);
                }
            });
            run_event_loop(&router, &irc, rx).await;
        }
        TransportKind::Matrix => {
            let matrix_config = config
                .transport
                .matrix
                .as_ref()
                .context("transport.kind is matrix but no matrix section is configured")?;
            let matrix = MatrixService::login(matrix_config).await?;
            let pump = matrix.clone();
            tokio::spawn(async move {
                if let Err(e) = pump.pump(tx, started_at).await {
                    tracing::error!("Matrix sync failed: {:#}", e);
                }
            });
            run_event_loop(&router, &matrix, rx).await;
        }
    }

    tracing::info!("{}", logs::SHUTDOWN);
    Ok(())
}

/// Drain transport events through the router.
/// Runs until the transport closes its side of the channel or the process is interrupted.
async fn run_event_loop(
    router: &CommandRouter,
    chat: &dyn ChatTransport,
    mut rx: mpsc::Receiver<InboundEvent>,
) {
    tracing::info!("{}", logs::EVENT_LOOP_START);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => router.handle(chat, event).await,
                None => {
                    tracing::warn!("{}", logs::EVENT_LOOP_CLOSED);
                    break;
                }
            },
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
                }
                break;
            }
        }
    }
}
