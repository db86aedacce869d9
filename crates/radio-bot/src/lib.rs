//! # radio-bot
//!
//! Telegram edge of the radio relay: long polling, update handlers, reply
//! rendering and the teloxide implementation of the `Messenger` port.

pub mod handlers;
pub mod inbound;
pub mod messenger;
pub mod replies;
pub mod server;

pub use messenger::TelegramMessenger;
pub use server::{run, BotState};
