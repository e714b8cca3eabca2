//! # Matrix Transport Adapter
//!
//! Implements the `ChatTransport` trait for the Matrix protocol using the `matrix_sdk`.
//! Rooms play the part of channels: the channel string is the room id.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::{
        MilliSecondsSinceUnixEpoch, RoomId,
        events::room::{
            member::{
                MembershipChange, MembershipState, OriginalSyncRoomMemberEvent,
                StrippedRoomMemberEvent,
            },
            message::{MessageType, RoomMessageEventContent, SyncRoomMessageEvent},
        },
    },
};
use tokio::sync::mpsc;

use crate::domain::config::MatrixConfig;
use crate::domain::traits::ChatTransport;
use crate::domain::types::{ChatEvent, InboundEvent};
use crate::strings::logs;

#[derive(Clone)]
pub struct MatrixService {
    client: Client,
}

impl MatrixService {
    pub async fn login(config: &MatrixConfig) -> Result<Self> {
        let client = Client::builder()
            .homeserver_url(&config.homeserver)
            .build()
            .await
            .context("Failed to build Matrix client")?;

        client
            .matrix_auth()
            .login_username(&config.username, &config.password)
            .send()
            .await
            .context("Matrix login failed")?;

        tracing::info!("{}", logs::LOGIN_SUCCESS);
        Ok(Self { client })
    }

    /// Register event handlers feeding `tx`, then run the sync loop until it fails.
    pub async fn pump(&self, tx: mpsc::Sender<InboundEvent>, started_at: DateTime<Utc>) -> Result<()> {
        let message_tx = tx.clone();
        self.client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
            let tx = message_tx.clone();
            async move {
                let Some(original_msg) = ev.as_original() else {
                    return;
                };
                // Ignore backlog delivered by the initial sync
                let Some(timestamp) = since_start(ev.origin_server_ts(), started_at) else {
                    return;
                };
                if original_msg.sender == room.own_user_id() {
                    return;
                }
                if let MessageType::Text(text_content) = &original_msg.content.msgtype {
                    let event = InboundEvent::Message(ChatEvent {
                        channel: room.room_id().to_string(),
                        user: original_msg.sender.to_string(),
                        text: text_content.body.clone(),
                        timestamp,
                    });
                    forward(&tx, event).await;
                }
            }
        });

        let join_tx = tx.clone();
        self.client.add_event_handler(move |ev: OriginalSyncRoomMemberEvent, room: Room| {
            let tx = join_tx.clone();
            async move {
                if since_start(ev.origin_server_ts, started_at).is_none() {
                    return;
                }
                if let Some(event) = joined_event(
                    ev.membership_change(),
                    room.room_id().as_str(),
                    ev.state_key.as_str(),
                ) {
                    forward(&tx, event).await;
                }
            }
        });

        let invite_tx = tx;
        self.client.add_event_handler(move |ev: StrippedRoomMemberEvent, room: Room| {
            let tx = invite_tx.clone();
            async move {
                if ev.content.membership == MembershipState::Invite
                    && ev.state_key == room.own_user_id()
                {
                    let event = InboundEvent::Invite {
                        channel: room.room_id().to_string(),
                    };
                    forward(&tx, event).await;
                }
            }
        });

        self.client
            .sync(SyncSettings::default())
            .await
            .context("Matrix sync loop failed")?;
        Ok(())
    }
}

/// Event time, or `None` for anything sent before the bot started.
fn since_start(ts: MilliSecondsSinceUnixEpoch, started_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let millis: u64 = ts.get().into();
    let timestamp = DateTime::<Utc>::from_timestamp_millis(i64::try_from(millis).ok()?)?;
    (timestamp >= started_at).then_some(timestamp)
}

/// Only fresh joins count; profile changes also arrive as member events.
fn joined_event(change: MembershipChange<'_>, room_id: &str, user: &str) -> Option<InboundEvent> {
    match change {
        MembershipChange::Joined => Some(InboundEvent::Joined {
            channel: room_id.to_string(),
            user: user.to_string(),
        }),
        _ => None,
    }
}

async fn forward(tx: &mpsc::Sender<InboundEvent>, event: InboundEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::debug!(error = %e, "Event loop gone, dropping Matrix event");
    }
}

#[async_trait]
impl ChatTransport for MatrixService {
    async fn join(&self, channel: &str) -> Result<(), String> {
        let room_id = RoomId::parse(channel).map_err(|e| e.to_string())?;
        self.client
            .join_room_by_id(&room_id)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), String> {
        tracing::info!("Bot sending message to {}: {}", channel, text);
        let room_id = RoomId::parse(channel).map_err(|e| e.to_string())?;
        let room = self
            .client
            .get_room(&room_id)
            .ok_or_else(|| format!("Not a member of room {channel}"))?;
        room.send(RoomMessageEventContent::text_plain(text))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
