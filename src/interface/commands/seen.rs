//! # Seen Command
//!
//! Handles `.seen <username>`: reports the most recent archived line from that user.

use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::ChatTransport;
use crate::domain::types::ChatEvent;
use crate::infrastructure::store::RecordStore;
use crate::interface::commands::reply;
use crate::strings::messages;

pub async fn handle_seen(
    store: &RecordStore,
    chat: &dyn ChatTransport,
    event: &ChatEvent,
    cmd: &str,
    args: &str,
) -> BotResult<()> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let [target] = tokens.as_slice() else {
        return Err(BotError::MalformedInput(messages::seen_usage(cmd)));
    };

    let msg = match store.find_most_recent_message_by_user(target) {
        Ok(found) => messages::last_seen(
            &found.username,
            &found
                .sent_at
                .format(store.precision().date_format())
                .to_string(),
            &found.message,
        ),
        Err(BotError::NotFound(_)) => {
            tracing::debug!(user = %target, "No history for user");
            messages::USER_NOT_FOUND.to_string()
        }
        Err(e) => return Err(e),
    };
    reply(chat, &event.channel, &msg).await;
    Ok(())
}
