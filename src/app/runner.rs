use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::{
    args::BarrageArgs,
    dispatcher::{Dispatcher, QueueCapacity},
    error::AppResult,
    http::RequestTarget,
    system::{
        RunReport, banner,
        shutdown_handlers::{
            setup_duration_shutdown_handler, setup_signal_shutdown_handler, shutdown_channel,
        },
    },
};

use super::progress::setup_progress_reporter;

/// Runs the load loop until Ctrl+C, SIGTERM or `--duration`, then drains the
/// pool and returns the final counts.
///
/// # Errors
///
/// Returns an error when the request target cannot be built, the workers
/// cannot be spawned, or the stop task fails to join.
pub(crate) async fn run_load(args: &BarrageArgs) -> AppResult<RunReport> {
    let target = Arc::new(RequestTarget::from_args(args, Handle::current())?);
    let dispatcher = Arc::new(build_dispatcher(args));

    if !args.quiet {
        banner::print_cli_banner(args.no_color, target.url(), dispatcher.pool_size());
    }

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let duration_handle = args
        .duration
        .map(|duration| setup_duration_shutdown_handler(&shutdown_tx, duration));

    dispatcher.start()?;
    let run_start = Instant::now();
    info!(
        "Sending to {} with {} workers every {:?}.",
        target.url(),
        dispatcher.pool_size(),
        args.interval
    );

    let progress_handle = setup_progress_reporter(
        target.stats(),
        Arc::clone(&dispatcher),
        args.report_interval,
        run_start,
        &shutdown_tx,
    );

    let bounded = args.queue_capacity.is_some();
    let mut ticker = interval(args.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut submitted: u64 = 0;
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                submit_request(&dispatcher, &target, bounded);
                submitted = submitted.saturating_add(1);
            }
        }
    }

    info!(
        "Stopping after {} submissions, draining {} queued requests.",
        submitted,
        dispatcher.pending()
    );
    let stopper = Arc::clone(&dispatcher);
    tokio::task::spawn_blocking(move || stopper.stop()).await?;
    let elapsed = run_start.elapsed();

    drop(shutdown_tx.send(()));
    progress_handle.await?;
    signal_handle.await?;
    if let Some(handle) = duration_handle {
        handle.await?;
    }

    let report = RunReport {
        stats: target.stats().snapshot(),
        elapsed,
        workers: dispatcher.pool_size().get(),
    };
    debug!("Final counts: {:?}", report.stats);
    Ok(report)
}

fn build_dispatcher(args: &BarrageArgs) -> Dispatcher {
    let capacity = args
        .queue_capacity
        .map_or(QueueCapacity::Unbounded, |capacity| {
            QueueCapacity::Bounded(capacity.as_non_zero())
        });
    let mut builder = Dispatcher::builder().capacity(capacity);
    if let Some(workers) = args.workers {
        builder = builder.workers(workers.as_non_zero());
    }
    builder.build()
}

/// A bounded queue can make `submit` wait for room, so that case leaves the
/// async worker thread first.
fn submit_request(dispatcher: &Dispatcher, target: &Arc<RequestTarget>, bounded: bool) {
    let task = target.task();
    if bounded {
        tokio::task::block_in_place(|| dispatcher.submit(task));
    } else {
        dispatcher.submit(task);
    }
}
