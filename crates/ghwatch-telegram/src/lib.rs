//! Telegram Bot API transport for ghwatch notifications.
//!
//! [`TelegramTransport`] implements [`ghwatch_core::transport::Transport`] by
//! posting rendered HTML messages to `sendMessage`.

mod client;

pub mod error;

pub use client::{DEFAULT_API_URL, TelegramConfig, TelegramTransport};
pub use error::{Error, Result};
