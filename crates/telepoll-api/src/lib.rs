//! # telepoll-api
//!
//! Telegram Bot API client. [`BotApi`] implements the core
//! [`Transport`](telepoll_core::traits::Transport) via `getUpdates`, and
//! exposes the send/edit methods handlers use to answer.

pub mod client;
pub mod utils;

pub use client::{BotApi, ChatAction, ChatId, MessageTarget, ParseMode, SendOptions};
