//! Long-polling runner: fetch → dispatch each → commit offset → repeat.
//!
//! Delivery is at-least-once. The offset is committed only after the whole
//! batch has been handed to the handler, so a crash mid-batch re-fetches the
//! batch on the next start instead of losing it.


use crate::{
    config::PollingConfig,
    cursor::Cursor,
    error::{PollError, TransportError},
    traits::{ErrorSink, Handler, OffsetStore, TracingErrorSink, Transport},
    types::Update,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle of a polling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Constructed, not started.
    Idle,
    /// Fetching and dispatching.
    Running,
    /// Cancellation observed; the in-flight batch is being finished.
    Stopping,
    /// Terminal.
    Stopped,
}

/// Tuning knobs for the poll loop.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub limit: u32,
    pub timeout: Duration,
    pub starting_offset: i64,
    pub max_consecutive_failures: u32,
    pub retry_delay: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for RunnerOptions {
    fn from(cfg: &PollingConfig) -> Self {
        Self {
            limit: cfg.limit,
            timeout: cfg.timeout(),
            starting_offset: cfg.starting_offset,
            max_consecutive_failures: cfg.max_consecutive_failures,
            retry_delay: cfg.retry_delay(),
        }
    }
}

/// What a finished session did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Offset the next session should start from.
    pub next_offset: i64,
    pub dispatched: u64,
    pub handler_failures: u64,
    pub transport_failures: u64,
}

/// Result of one fetch-dispatch-advance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cycle {
    Empty,
    Dispatched(usize),
    TransportFailed,
    Cancelled,
}

/// Drives one polling session over a [`Transport`] and a [`Handler`].
///
/// The runner owns the cursor; nothing else writes it. Dropping the runner
/// releases the transport and whatever connection pool it holds.
pub struct LongPollingRunner {
    transport: Arc<dyn Transport>,
    handler: Arc<dyn Handler>,
    sink: Arc<dyn ErrorSink>,
    store: Option<Arc<dyn OffsetStore>>,
    options: RunnerOptions,
    cursor: Cursor,
    state: RunnerState,
    consecutive_failures: u32,
    report: SessionReport,
}

impl LongPollingRunner {
    pub fn new(
        transport: Arc<dyn Transport>,
        handler: Arc<dyn Handler>,
        options: RunnerOptions,
    ) -> Self {
        let cursor = Cursor::new(options.starting_offset);
        Self {
            transport,
            handler,
            sink: Arc::new(TracingErrorSink),
            store: None,
            options,
            cursor,
            state: RunnerState::Idle,
            consecutive_failures: 0,
            report: SessionReport::default(),
        }
    }

    /// Report recoverable failures somewhere other than the log.
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Resume from, and commit to, a persistent offset store.
    pub fn with_offset_store(mut self, store: Arc<dyn OffsetStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn next_offset(&self) -> i64 {
        self.cursor.next_offset()
    }

    /// Run until `cancel` fires or a fatal error occurs.
    ///
    /// Cancellation is observed between batches and while waiting on the
    /// network; a batch that is being dispatched always finishes first.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<SessionReport, PollError> {
        self.run_session(&cancel).await
    }

    async fn run_session(&mut self, cancel: &CancellationToken) -> Result<SessionReport, PollError> {
        self.set_state(RunnerState::Running);
        self.restore_offset().await;

        if let Err(e) = self.handler.on_start().await {
            error!("handler start-up failed: {e}");
            self.set_state(RunnerState::Stopped);
            return Err(PollError::Startup(e));
        }

        info!(
            "long polling started | offset: {} | limit: {} | timeout: {}s",
            self.cursor.next_offset(),
            self.options.limit,
            self.options.timeout.as_secs()
        );

        loop {
            if cancel.is_cancelled() {
                self.set_state(RunnerState::Stopping);
                break;
            }
            match self.poll_once(cancel).await {
                Ok(Cycle::Cancelled) => {
                    self.set_state(RunnerState::Stopping);
                    break;
                }
                Ok(Cycle::Empty | Cycle::Dispatched(_) | Cycle::TransportFailed) => {}
                Err(e) => {
                    error!("long polling stopped: {e}");
                    self.set_state(RunnerState::Stopped);
                    return Err(e);
                }
            }
        }

        self.set_state(RunnerState::Stopped);
        self.report.next_offset = self.cursor.next_offset();
        info!(
            "long polling stopped | next offset: {} | dispatched: {} | handler errors: {}",
            self.report.next_offset, self.report.dispatched, self.report.handler_failures
        );
        Ok(self.report.clone())
    }

    /// One fetch-dispatch-advance cycle.
    async fn poll_once(&mut self, cancel: &CancellationToken) -> Result<Cycle, PollError> {
        let offset = self.cursor.next_offset();

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Cycle::Cancelled),
            res = self.transport.fetch(offset, self.options.limit, self.options.timeout) => res,
        };

        let batch = match fetched {
            Ok(batch) => batch,
            Err(err) => return self.on_transport_failure(offset, err, cancel).await,
        };
        self.consecutive_failures = 0;

        let batch = in_dispatch_order(batch, offset);
        if batch.is_empty() {
            return Ok(Cycle::Empty);
        }
        debug!("received {} updates at offset {offset}", batch.len());

        for update in &batch {
            self.dispatch(update).await;
        }

        self.cursor.advance(&batch);
        self.commit_offset().await;
        Ok(Cycle::Dispatched(batch.len()))
    }

    async fn dispatch(&mut self, update: &Update) {
        debug!("dispatching update {} ({})", update.id, update.kind());
        self.report.dispatched += 1;
        if let Err(e) = self.handler.handle(update).await {
            self.report.handler_failures += 1;
            self.sink.handler_failed(update.id, &e);
        }
    }

    async fn on_transport_failure(
        &mut self,
        offset: i64,
        err: TransportError,
        cancel: &CancellationToken,
    ) -> Result<Cycle, PollError> {
        self.consecutive_failures += 1;
        self.report.transport_failures += 1;
        self.sink
            .transport_failed(offset, self.consecutive_failures, &err);

        if self.consecutive_failures > self.options.max_consecutive_failures {
            return Err(PollError::TooManyFailures {
                attempts: self.consecutive_failures,
                last: err,
            });
        }

        let delay = retry_delay(&err, self.options.retry_delay);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Ok(Cycle::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(Cycle::TransportFailed),
        }
    }

    async fn restore_offset(&mut self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(Ok(Some(stored))) => {
                if stored > self.cursor.next_offset() {
                    info!("resuming from stored offset {stored}");
                }
                self.cursor.fast_forward(stored);
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => warn!("failed to load stored offset: {e}"),
            Err(e) => warn!("offset load task failed: {e}"),
        }
    }

    /// Store I/O is blocking; run it off the async worker.
    async fn commit_offset(&self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let offset = self.cursor.next_offset();
        match tokio::task::spawn_blocking(move || store.save(offset)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to persist offset {offset}: {e}"),
            Err(e) => warn!("offset save task failed: {e}"),
        }
    }

    fn set_state(&mut self, next: RunnerState) {
        debug!("runner state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Sort ascending and drop anything below `offset` or repeated, so ids
/// reach the handler strictly increasing even if the server misbehaves.
fn in_dispatch_order(mut batch: Vec<Update>, offset: i64) -> Vec<Update> {
    batch.sort_by_key(|u| u.id);
    batch.dedup_by_key(|u| u.id);
    let before = batch.len();
    batch.retain(|u| u.id >= offset);
    if batch.len() < before {
        warn!(
            "dropped {} already-acknowledged updates below offset {offset}",
            before - batch.len()
        );
    }
    batch
}

/// The configured delay, stretched to `retry_after` when the API asked for more.
fn retry_delay(err: &TransportError, configured: Duration) -> Duration {
    match err {
        TransportError::Api {
            retry_after: Some(secs),
            ..
        } => configured.max(Duration::from_secs(*secs)),
        _ => configured,
    }
}
