//! Bot API methods.

use super::params::{ChatAction, ChatId, SendOptions};
use super::request::REQUEST_TIMEOUT;
use super::BotApi;
use crate::utils::split_message;
use serde_json::{json, Map, Value};
use std::time::Duration;
use telepoll_core::{
    error::TransportError,
    types::{Message, Update, User, WebhookInfo},
};
use tracing::warn;

/// Longest text a single `sendMessage` accepts, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Extra client-side wait on top of the long-poll timeout, so the HTTP
/// deadline never fires before the server answers.
const LONG_POLL_MARGIN: Duration = Duration::from_secs(10);

/// Which message an edit applies to.
#[derive(Debug, Clone)]
pub enum MessageTarget {
    /// A message the bot sent to a chat.
    Chat { chat_id: ChatId, message_id: i64 },
    /// A message sent via the bot in inline mode.
    Inline(String),
}

impl BotApi {
    /// Identity of the bot. Handy for checking the token.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &json!({}), REQUEST_TIMEOUT).await
    }

    /// Long-poll for updates with `update_id >= offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        limit: u32,
        timeout: Duration,
    ) -> Result<Vec<Update>, TransportError> {
        let params = json!({
            "offset": offset,
            "limit": limit,
            "timeout": timeout.as_secs(),
        });
        self.call("getUpdates", &params, timeout + LONG_POLL_MARGIN)
            .await
    }

    /// Send a text message, split into several if longer than
    /// [`MAX_MESSAGE_LEN`]. Returns the last message sent.
    ///
    /// Only the first part replies to `reply_to_message_id`; only the last
    /// part carries `reply_markup`.
    pub async fn send_message(
        &self,
        chat_id: impl Into<ChatId>,
        text: &str,
        options: &SendOptions,
    ) -> Result<Message, TransportError> {
        let chat_id = chat_id.into();
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        let last = chunks.len().saturating_sub(1);

        let mut sent = None;
        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut opts = options.clone();
            if i > 0 {
                opts.reply_to_message_id = None;
            }
            if i < last {
                opts.reply_markup = None;
            }
            sent = Some(self.send_text_chunk(&chat_id, chunk, &opts).await?);
        }
        sent.ok_or_else(|| TransportError::Malformed("nothing to send".into()))
    }

    async fn send_text_chunk(
        &self,
        chat_id: &ChatId,
        text: &str,
        options: &SendOptions,
    ) -> Result<Message, TransportError> {
        let params = message_params(chat_id, text, options);
        match self.call("sendMessage", &params, REQUEST_TIMEOUT).await {
            Err(TransportError::Api { description, .. })
                if options.parse_mode.is_some() && description.contains("can't parse entities") =>
            {
                warn!("markup parse failed, retrying as plain text: {description}");
                let plain = SendOptions {
                    parse_mode: None,
                    ..options.clone()
                };
                let params = message_params(chat_id, text, &plain);
                self.call("sendMessage", &params, REQUEST_TIMEOUT).await
            }
            other => other,
        }
    }

    /// Replace the text of a sent message. Inline messages yield `None`
    /// because the API only answers `true` for them.
    pub async fn edit_message_text(
        &self,
        target: &MessageTarget,
        text: &str,
        options: &SendOptions,
    ) -> Result<Option<Message>, TransportError> {
        let mut params = Map::new();
        match target {
            MessageTarget::Chat {
                chat_id,
                message_id,
            } => {
                params.insert("chat_id".into(), to_value(chat_id));
                params.insert("message_id".into(), Value::from(*message_id));
            }
            MessageTarget::Inline(id) => {
                params.insert("inline_message_id".into(), Value::from(id.as_str()));
            }
        }
        params.insert("text".into(), Value::from(text));
        options.apply(&mut params);

        let result: Value = self
            .call("editMessageText", &Value::Object(params), REQUEST_TIMEOUT)
            .await?;
        match result {
            Value::Bool(_) => Ok(None),
            other => serde_json::from_value(other)
                .map(Some)
                .map_err(|e| TransportError::Malformed(format!("editMessageText: {e}"))),
        }
    }

    /// Show a status such as "typing…" in the chat for a few seconds.
    pub async fn send_chat_action(
        &self,
        chat_id: impl Into<ChatId>,
        action: ChatAction,
    ) -> Result<(), TransportError> {
        let chat_id: ChatId = chat_id.into();
        let params = json!({
            "chat_id": to_value(&chat_id),
            "action": action,
        });
        self.call::<bool>("sendChatAction", &params, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Acknowledge a callback button press, optionally with a notification.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<bool, TransportError> {
        let mut params = Map::new();
        params.insert("callback_query_id".into(), Value::from(callback_query_id));
        if let Some(text) = text {
            params.insert("text".into(), Value::from(text));
        }
        if show_alert {
            params.insert("show_alert".into(), Value::Bool(true));
        }
        self.call("answerCallbackQuery", &Value::Object(params), REQUEST_TIMEOUT)
            .await
    }

    pub async fn send_location(
        &self,
        chat_id: impl Into<ChatId>,
        latitude: f64,
        longitude: f64,
        options: &SendOptions,
    ) -> Result<Message, TransportError> {
        let chat_id: ChatId = chat_id.into();
        let mut params = Map::new();
        params.insert("chat_id".into(), to_value(&chat_id));
        params.insert("latitude".into(), Value::from(latitude));
        params.insert("longitude".into(), Value::from(longitude));
        options.apply(&mut params);
        self.call("sendLocation", &Value::Object(params), REQUEST_TIMEOUT)
            .await
    }

    /// Remove a webhook so that `getUpdates` works. A no-op when none is set.
    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<bool, TransportError> {
        let params = json!({ "drop_pending_updates": drop_pending_updates });
        self.call("deleteWebhook", &params, REQUEST_TIMEOUT).await
    }

    pub async fn get_webhook_info(&self) -> Result<WebhookInfo, TransportError> {
        self.call("getWebhookInfo", &json!({}), REQUEST_TIMEOUT)
            .await
    }
}

pub(crate) fn message_params(chat_id: &ChatId, text: &str, options: &SendOptions) -> Value {
    let mut params = Map::new();
    params.insert("chat_id".into(), to_value(chat_id));
    params.insert("text".into(), Value::from(text));
    options.apply(&mut params);
    Value::Object(params)
}

fn to_value(chat_id: &ChatId) -> Value {
    match chat_id {
        ChatId::Id(id) => Value::from(*id),
        ChatId::Username(name) => Value::from(name.as_str()),
    }
}
