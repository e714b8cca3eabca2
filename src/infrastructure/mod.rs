//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (`ChatTransport`, `WeatherProvider`)
//! and owns the embedded record store and the log viewer.

pub mod irc;
pub mod matrix;
pub mod store;
pub mod weather;
pub mod web;
