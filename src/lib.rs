//! Trackbot — chat-bot message pipeline.
//!
//! Turns inbound messaging-webhook deliveries into authenticated, typed
//! records (expense / food / habit / journal) and replies to the user.

pub mod auth;
pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod records;
pub mod session;
pub mod webhook;

pub use config::BotConfig;
pub use error::{Error, Result};
