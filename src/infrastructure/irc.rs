//! # IRC Transport Adapter
//!
//! Implements the `ChatTransport` trait for IRC using the `irc` crate, and pumps the
//! connection's message stream into the bot's event channel.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use irc::client::prelude::{Client, Command, Config, Message};
use irc::client::{ClientStream, Sender};
use tokio::sync::mpsc;

use crate::domain::config::IrcConfig;
use crate::domain::traits::ChatTransport;
use crate::domain::types::{ChatEvent, InboundEvent};
use crate::strings::logs;

#[derive(Clone)]
pub struct IrcService {
    sender: Sender,
    nickname: String,
}

impl IrcService {
    /// Connect, register and request the configured channels.
    pub async fn connect(config: &IrcConfig) -> Result<(Self, ClientStream)> {
        tracing::info!("{}", logs::connecting(&config.server, config.port));

        let irc_config = Config {
            nickname: Some(config.nickname.clone()),
            username: Some(config.nickname.clone()),
            realname: Some(config.nickname.clone()),
            server: Some(config.server.clone()),
            port: Some(config.port),
            use_tls: Some(config.use_tls),
            channels: config.channels.clone(),
            ..Config::default()
        };

        let mut client = Client::from_config(irc_config)
            .await
            .context("Connection Failed")?;
        client.identify().context("Failed to register with server")?;
        let stream = client.stream()?;

        Ok((
            Self {
                sender: client.sender(),
                nickname: config.nickname.clone(),
            },
            stream,
        ))
    }

    /// Forward server messages as `InboundEvent`s until the stream ends or the receiver goes away.
    pub async fn pump(&self, mut stream: ClientStream, tx: mpsc::Sender<InboundEvent>) -> Result<()> {
        while let Some(message) = stream.next().await.transpose()? {
            let Some(event) = to_inbound(&message, &self.nickname) else {
                continue;
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Map one IRC message onto the bot's event model. Our own lines are dropped.
fn to_inbound(message: &Message, own_nick: &str) -> Option<InboundEvent> {
    let source = message.source_nickname();
    match &message.command {
        Command::PRIVMSG(_, text) => {
            let user = source?;
            if user == own_nick {
                return None;
            }
            Some(InboundEvent::Message(ChatEvent {
                channel: message.response_target()?.to_string(),
                user: user.to_string(),
                text: text.clone(),
                timestamp: Utc::now(),
            }))
        }
        Command::INVITE(_, channel) => Some(InboundEvent::Invite {
            channel: channel.clone(),
        }),
        Command::JOIN(channel, _, _) => {
            let user = source?;
            if user == own_nick {
                tracing::info!(channel = %channel, "Joined channel");
            }
            Some(InboundEvent::Joined {
                channel: channel.clone(),
                user: user.to_string(),
            })
        }
        _ => None,
    }
}

#[async_trait]
impl ChatTransport for IrcService {
    async fn join(&self, channel: &str) -> Result<(), String> {
        self.sender.send_join(channel).map_err(|e| e.to_string())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), String> {
        tracing::info!("Bot sending message to {}: {}", channel, text);
        self.sender
            .send_privmsg(channel, text)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Message {
        line.parse().unwrap()
    }

    #[test]
    fn test_channel_privmsg() {
        let msg = parse(":alice!a@host PRIVMSG #itsk :.quote\r\n");
        match to_inbound(&msg, "Itsk") {
            Some(InboundEvent::Message(ev)) => {
                assert_eq!(ev.channel, "#itsk");
                assert_eq!(ev.user, "alice");
                assert_eq!(ev.text, ".quote");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_private_query_replies_to_sender() {
        let msg = parse(":alice!a@host PRIVMSG Itsk :.uptime\r\n");
        match to_inbound(&msg, "Itsk") {
            Some(InboundEvent::Message(ev)) => assert_eq!(ev.channel, "alice"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_own_messages_ignored() {
        let msg = parse(":Itsk!i@host PRIVMSG #itsk :hello\r\n");
        assert!(to_inbound(&msg, "Itsk").is_none());
    }

    #[test]
    fn test_invite() {
        let msg = parse(":alice!a@host INVITE Itsk #secret\r\n");
        assert_eq!(
            to_inbound(&msg, "Itsk"),
            Some(InboundEvent::Invite {
                channel: "#secret".to_string()
            })
        );
    }

    #[test]
    fn test_join() {
        let msg = parse(":bob!b@host JOIN #itsk\r\n");
        assert_eq!(
            to_inbound(&msg, "Itsk"),
            Some(InboundEvent::Joined {
                channel: "#itsk".to_string(),
                user: "bob".to_string()
            })
        );
    }
}
