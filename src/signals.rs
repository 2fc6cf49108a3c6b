//! Shutdown signals: the first one stops polling after the current batch,
//! the second one ends the process.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Cancel `cancel` on the first signal, then return on the second.
pub async fn watch<F, Fut>(mut next_signal: F, cancel: CancellationToken)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    next_signal().await;
    info!("Received shutdown signal, finishing the current batch (signal again to force)");
    cancel.cancel();

    next_signal().await;
    warn!("Received second shutdown signal, exiting immediately");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::{mpsc, Mutex};

    fn channel_signals() -> (
        mpsc::UnboundedSender<()>,
        impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let rx = Arc::new(Mutex::new(rx));
        let next = move || {
            let rx = rx.clone();
            Box::pin(async move {
                rx.lock().await.recv().await;
            }) as std::pin::Pin<Box<dyn Future<Output = ()> + Send>>
        };
        (tx, next)
    }

    #[tokio::test]
    async fn test_first_signal_cancels_second_returns() {
        let (tx, next) = channel_signals();
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(watch(next, cancel.clone()));

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), cancel.cancelled())
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert!(!watcher.is_finished());

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), watcher)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_signal_no_cancel() {
        let (_tx, next) = channel_signals();
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(watch(next, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!cancel.is_cancelled());
        watcher.abort();
    }
}
