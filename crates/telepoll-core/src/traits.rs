use crate::{
    error::{HandlerError, TransportError},
    types::Update,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, warn};

/// Source of updates: one long-poll request per call.
///
/// Implementations hold no cursor state: the runner passes the offset in.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch updates with `update_id >= offset`, ascending by id.
    ///
    /// The server may hold the request for up to `timeout` before replying.
    /// An empty batch is a normal outcome.
    async fn fetch(
        &self,
        offset: i64,
        limit: u32,
        timeout: Duration,
    ) -> Result<Vec<Update>, TransportError>;
}

/// Bot logic. Receives every update in arrival order.
///
/// The runner awaits `handle` before passing the next update. A handler that
/// spawns work of its own must keep any ordering it promises its users,
/// e.g. per chat.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Called once before the first fetch.
    async fn on_start(&self) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Process one update. An error is reported and the runner moves on.
    async fn handle(&self, update: &Update) -> Result<(), HandlerError>;
}

/// Where the runner reports recoverable failures.
pub trait ErrorSink: Send + Sync {
    fn transport_failed(&self, offset: i64, attempt: u32, err: &TransportError);

    fn handler_failed(&self, update_id: i64, err: &HandlerError);
}

/// Default sink: writes to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn transport_failed(&self, offset: i64, attempt: u32, err: &TransportError) {
        warn!("failed to get updates (offset {offset}, attempt {attempt}): {err}");
    }

    fn handler_failed(&self, update_id: i64, err: &HandlerError) {
        error!("error while handling update {update_id}: {err}");
    }
}

/// Persists the committed offset between process runs.
pub trait OffsetStore: Send + Sync {
    fn load(&self) -> Result<Option<i64>, crate::error::TelepollError>;

    fn save(&self, offset: i64) -> Result<(), crate::error::TelepollError>;
}
