//! # Quote Commands
//!
//! Handles `.addquote <text>` and `.quote`.
//! Quotes are stored without the command token; retrieval samples uniformly over the dense ids.

use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::ChatTransport;
use crate::domain::types::ChatEvent;
use crate::infrastructure::store::RecordStore;
use crate::interface::commands::reply;
use crate::strings::messages;

const QUOTE_DATE_FORMAT: &str = "%m-%d-%Y";

pub async fn handle_add_quote(
    store: &RecordStore,
    chat: &dyn ChatTransport,
    event: &ChatEvent,
    cmd: &str,
    args: &str,
) -> BotResult<()> {
    let text = args.trim();
    if text.is_empty() {
        return Err(BotError::MalformedInput(messages::add_quote_usage(cmd)));
    }

    let id = store.insert_quote(&event.user, text, event.timestamp)?;
    tracing::info!(id, user = %event.user, "Quote stored");
    reply(chat, &event.channel, &messages::quote_added(id)).await;
    Ok(())
}

pub async fn handle_fetch_quote(
    store: &RecordStore,
    chat: &dyn ChatTransport,
    event: &ChatEvent,
) -> BotResult<()> {
    let quote = {
        let mut rng = rand::thread_rng();
        store.random_quote(&mut rng)?
    };

    let msg = match quote {
        Some(q) => messages::quote_line(
            &q.username,
            &q.submitted_at.format(QUOTE_DATE_FORMAT).to_string(),
            &q.text,
        ),
        None => messages::NO_QUOTES.to_string(),
    };
    reply(chat, &event.channel, &msg).await;
    Ok(())
}
