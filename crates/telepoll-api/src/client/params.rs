//! Request parameter types.

use serde::Serialize;
use serde_json::{Map, Value};

/// Target chat: numeric id or `@channelusername`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(username: &str) -> Self {
        Self::Username(username.to_string())
    }
}

impl From<String> for ChatId {
    fn from(username: String) -> Self {
        Self::Username(username)
    }
}

/// <https://core.telegram.org/bots/api#formatting-options>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

/// <https://core.telegram.org/bots/api#sendchataction>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    RecordVideo,
    UploadVideo,
    RecordVoice,
    UploadVoice,
    UploadDocument,
    FindLocation,
}

/// Optional knobs shared by the send/edit methods. Defaults send nothing.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
    pub disable_notification: bool,
    pub reply_to_message_id: Option<i64>,
    /// Inline or reply keyboard, already in Bot API JSON shape.
    pub reply_markup: Option<Value>,
}

impl SendOptions {
    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    /// Copy the set options into a request body. Unset flags are omitted.
    pub(crate) fn apply(&self, params: &mut Map<String, Value>) {
        if let Some(mode) = self.parse_mode {
            params.insert("parse_mode".into(), serde_json::to_value(mode).unwrap_or_default());
        }
        if self.disable_web_page_preview {
            params.insert("disable_web_page_preview".into(), Value::Bool(true));
        }
        if self.disable_notification {
            params.insert("disable_notification".into(), Value::Bool(true));
        }
        if let Some(id) = self.reply_to_message_id {
            params.insert("reply_to_message_id".into(), Value::from(id));
        }
        if let Some(ref markup) = self.reply_markup {
            params.insert("reply_markup".into(), markup.clone());
        }
    }
}
