//! # Message Archive
//!
//! Default handler: every line that is not a command is appended to the log.

use crate::domain::error::BotResult;
use crate::domain::types::ChatEvent;
use crate::infrastructure::store::RecordStore;

pub fn handle_archive(store: &RecordStore, event: &ChatEvent) -> BotResult<()> {
    store.append_logged_message(&event.channel, &event.user, &event.text, event.timestamp)
}
