//! Minimal Telegram Bot API transport for Banter.
//!
//! Long-polls `getUpdates` and replies with `sendMessage` — nothing
//! more. The worker loop in the binary owns offsets and dispatch.

mod client;
mod types;

pub use client::{DEFAULT_API_BASE_URL, TelegramClient};
pub use types::{Chat, Message, Update};
