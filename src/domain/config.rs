//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the transport, command table, storage, weather and web settings.

use crate::domain::types::TimestampPrecision;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Greeting posted to a channel whenever someone joins it.
    #[serde(default)]
    pub join_message: Option<String>,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.weather.timeout_secs == 0 {
            bail!("weather.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Irc,
    Matrix,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,
    #[serde(default)]
    pub irc: IrcConfig,
    #[serde(default)]
    pub matrix: Option<MatrixConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IrcConfig {
    #[serde(default = "default_irc_server")]
    pub server: String,
    #[serde(default = "default_irc_port")]
    pub port: u16,
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default)]
    pub channels: Vec<String>,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: default_irc_server(),
            port: default_irc_port(),
            nickname: default_nickname(),
            use_tls: false,
            channels: Vec::new(),
        }
    }
}

fn default_irc_server() -> String {
    "irc.freenode.net".to_string()
}
fn default_irc_port() -> u16 {
    6667
}
fn default_nickname() -> String {
    "Itsk".to_string()
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
}

/// The handler a command token is bound to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    FetchQuote,
    AddQuote,
    FetchWeather,
    AddWeather,
    LastSeen,
    Uptime,
}

/// Token -> handler table. Only listed tokens are treated as commands.
#[derive(Debug, Deserialize, Clone)]
pub struct CommandsConfig {
    #[serde(default = "default_command_table")]
    pub table: BTreeMap<String, CommandKind>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            table: default_command_table(),
        }
    }
}

impl CommandsConfig {
    /// First token bound to `kind`, used when a reply needs to name a command.
    pub fn token_for(&self, kind: CommandKind) -> Option<&str> {
        self.table
            .iter()
            .find(|(_, k)| **k == kind)
            .map(|(token, _)| token.as_str())
    }
}

fn default_command_table() -> BTreeMap<String, CommandKind> {
    BTreeMap::from([
        (".quote".to_string(), CommandKind::FetchQuote),
        (".addquote".to_string(), CommandKind::AddQuote),
        (".weather".to_string(), CommandKind::FetchWeather),
        (".addweather".to_string(), CommandKind::AddWeather),
        (".seen".to_string(), CommandKind::LastSeen),
        (".uptime".to_string(), CommandKind::Uptime),
    ])
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default)]
    pub timestamp_precision: TimestampPrecision,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            timestamp_precision: TimestampPrecision::default(),
        }
    }
}

fn default_db_path() -> String {
    "data/itsk.db".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

fn default_weather_url() -> String {
    "http://wttr.in".to_string()
}
fn default_weather_timeout() -> u64 {
    10
}

/// Read-only log viewer.
#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_realm")]
    pub realm: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: default_bind(),
            username: String::new(),
            password: String::new(),
            realm: default_realm(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_realm() -> String {
    "Please enter your username and password for this site.".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub directory: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_dir() -> String {
    ".log".to_string()
}
fn default_log_file() -> String {
    "log.txt".to_string()
}
fn default_log_filter() -> String {
    "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config.transport.kind, TransportKind::Irc);
        assert_eq!(config.transport.irc.port, 6667);
        assert_eq!(config.commands.table.len(), 6);
        assert_eq!(config.storage.timestamp_precision, TimestampPrecision::Day);
        assert_eq!(config.weather.timeout_secs, 10);
        assert!(!config.web.enabled);
    }

    #[test]
    fn test_command_subset() {
        let yaml = r#"
commands:
  table:
    ".quote": fetch_quote
    ".addquote": add_quote
storage:
  timestamp_precision: second
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.commands.table.len(), 2);
        assert_eq!(config.commands.table.get(".quote"), Some(&CommandKind::FetchQuote));
        assert!(config.commands.table.get(".weather").is_none());
        assert_eq!(config.storage.timestamp_precision, TimestampPrecision::Second);
    }

    #[test]
    fn test_token_for() {
        let commands = CommandsConfig::default();
        assert_eq!(commands.token_for(CommandKind::AddWeather), Some(".addweather"));
    }

    #[test]
    fn test_matrix_transport() {
        let yaml = r#"
transport:
  kind: matrix
  matrix:
    username: "@itsk:example.org"
    password: "hunter2"
    homeserver: "https://example.org"
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.transport.kind, TransportKind::Matrix);
        assert_eq!(config.transport.matrix.unwrap().homeserver, "https://example.org");
    }

    #[test]
    fn test_zero_weather_timeout_is_rejected() {
        let err = AppConfig::from_yaml("weather:\n  timeout_secs: 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
        let ok = AppConfig::from_yaml("weather:\n  timeout_secs: 1\n").unwrap();
        assert_eq!(ok.weather.timeout_secs, 1);
    }
}
