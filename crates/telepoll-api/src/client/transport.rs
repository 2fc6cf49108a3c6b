use super::BotApi;
use async_trait::async_trait;
use std::time::Duration;
use telepoll_core::{error::TransportError, traits::Transport, types::Update};

#[async_trait]
impl Transport for BotApi {
    async fn fetch(
        &self,
        offset: i64,
        limit: u32,
        timeout: Duration,
    ) -> Result<Vec<Update>, TransportError> {
        self.get_updates(offset, limit, timeout).await
    }
}
