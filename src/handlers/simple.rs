use async_trait::async_trait;
use std::sync::Arc;
use telepoll_api::BotApi;
use telepoll_core::{error::HandlerError, traits::Handler, types::Update};
use tracing::info;

/// Logs the bot identity on start and every update it receives.
pub struct SimpleHandler {
    api: Arc<BotApi>,
}

impl SimpleHandler {
    pub fn new(api: Arc<BotApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Handler for SimpleHandler {
    async fn on_start(&self) -> Result<(), HandlerError> {
        let me = self.api.get_me().await?;
        info!("Me: {} (id {})", me.display_name(), me.id);
        Ok(())
    }

    async fn handle(&self, update: &Update) -> Result<(), HandlerError> {
        info!("Received update {} ({}): {update:?}", update.id, update.kind());
        Ok(())
    }
}
