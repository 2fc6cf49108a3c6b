use async_trait::async_trait;
use std::sync::Arc;
use telepoll_api::{BotApi, SendOptions};
use telepoll_core::{error::HandlerError, traits::Handler, types::Update};
use tracing::debug;

/// Replies to every text message with the same text.
pub struct EchoHandler {
    api: Arc<BotApi>,
}

impl EchoHandler {
    pub fn new(api: Arc<BotApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, update: &Update) -> Result<(), HandlerError> {
        let Some(ref message) = update.message else {
            debug!("echo: skipping {} update {}", update.kind(), update.id);
            return Ok(());
        };
        let Some(ref text) = message.text else {
            return Ok(());
        };
        if text.trim().is_empty() {
            return Ok(());
        }

        let options = SendOptions::default().reply_to(message.id);
        self.api
            .send_message(message.chat.id, text, &options)
            .await?;
        Ok(())
    }
}
