//! # Errors
//!
//! Failure taxonomy shared by the store, handlers and the weather provider.
//! None of these are fatal: the router logs them and keeps the session alive.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// Store unavailable or a write failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Expected absence (no history, no location configured).
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad command syntax; carries the usage text shown to the user.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Network failure, timeout or non-success status from the weather provider.
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<rusqlite::Error> for BotError {
    fn from(e: rusqlite::Error) -> Self {
        BotError::Storage(e.to_string())
    }
}

pub type BotResult<T> = Result<T, BotError>;
