pub const STARTING: &str = "Starting...";
pub const LOGIN_SUCCESS: &str = "Logged in successfully!";
pub const EVENT_LOOP_START: &str = "Starting event loop...";
pub const EVENT_LOOP_CLOSED: &str = "Transport closed the event stream, shutting down";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn config_loaded(path: &str) -> String {
    format!("Loaded configuration from {path}")
}

pub fn connecting(server: &str, port: u16) -> String {
    format!("Connecting to {server}:{port}...")
}

pub fn store_opened(path: &str, quotes: i64) -> String {
    format!("Record store opened at {path} ({quotes} quotes)")
}

pub fn web_listening(addr: &str) -> String {
    format!("Running web server on {addr}")
}

pub fn invite_received(channel: &str) -> String {
    format!("Received invite for {channel}")
}

pub fn join_invite_fail(channel: &str, err: &str) -> String {
    format!("Failed to join {channel} after invite: {err}")
}

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}
