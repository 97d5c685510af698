use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, interval_at};
use tracing::info;

use crate::{
    dispatcher::Dispatcher,
    http::RequestStats,
    system::{progress_line, shutdown_handlers::ShutdownSender},
};

/// Logs a progress line every `every` until shutdown.
pub(crate) fn setup_progress_reporter(
    stats: Arc<RequestStats>,
    dispatcher: Arc<Dispatcher>,
    every: Duration,
    run_start: Instant,
    shutdown_tx: &ShutdownSender,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let first = run_start.checked_add(every).unwrap_or(run_start);
        let mut ticker = interval_at(first, every);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {
                    let snapshot = stats.snapshot();
                    info!(
                        "{}",
                        progress_line(&snapshot, run_start.elapsed(), dispatcher.pending())
                    );
                }
            }
        }
    })
}
