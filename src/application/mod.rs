//! # Application Layer
//!
//! Contains the core logic of the bot: command routing, weather page parsing,
//! uptime arithmetic and logging setup.

pub mod logging;
pub mod router;
pub mod uptime;
pub mod weather_parser;
