//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., .quote, .weather, .seen).
//! These handlers are invoked by the Router.

pub mod archive;
pub mod quote;
pub mod seen;
pub mod uptime;
pub mod weather;

use crate::domain::traits::ChatTransport;

/// Send a reply; a failed send is logged and otherwise ignored.
pub(crate) async fn reply(chat: &dyn ChatTransport, channel: &str, text: &str) {
    if let Err(e) = chat.send_message(channel, text).await {
        tracing::warn!(channel, error = %e, "Failed to send reply");
    }
}
