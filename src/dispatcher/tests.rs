use super::*;
use crate::error::{AppError, AppResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const PROMPT_STOP_TIMEOUT: Duration = Duration::from_secs(5);
const BLOCKED_PRODUCER_SETTLE: Duration = Duration::from_millis(50);

fn pool(workers: usize) -> AppResult<Dispatcher> {
    let workers = NonZeroUsize::new(workers).ok_or_else(|| AppError::dispatch("zero workers"))?;
    Ok(Dispatcher::with_workers(workers))
}

fn counting_task(counter: &Arc<AtomicUsize>) -> Task {
    let counter = Arc::clone(counter);
    Task::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn expect_count(counter: &AtomicUsize, expected: usize) -> AppResult<()> {
    let actual = counter.load(Ordering::SeqCst);
    if actual != expected {
        return Err(AppError::dispatch(format!(
            "expected {} executed tasks, got {}",
            expected, actual
        )));
    }
    Ok(())
}

#[test]
fn runs_every_task_submitted_before_stop() -> AppResult<()> {
    let dispatcher = pool(4)?;
    let counter = Arc::new(AtomicUsize::new(0));
    dispatcher.start()?;

    for _ in 0..1000 {
        dispatcher.submit(counting_task(&counter));
    }
    dispatcher.stop();

    expect_count(&counter, 1000)
}

#[test]
fn two_workers_drain_hundred_tasks_on_immediate_stop() -> AppResult<()> {
    let dispatcher = pool(2)?;
    let counter = Arc::new(AtomicUsize::new(0));
    dispatcher.start()?;
    if dispatcher.worker_count() != 2 {
        return Err(AppError::dispatch("expected two live workers"));
    }

    for _ in 0..100 {
        dispatcher.submit(counting_task(&counter));
    }
    dispatcher.stop();

    expect_count(&counter, 100)?;
    if dispatcher.worker_count() != 0 {
        return Err(AppError::dispatch("workers still alive after stop"));
    }
    if dispatcher.pending() != 0 {
        return Err(AppError::dispatch("queue not drained after stop"));
    }
    Ok(())
}

#[test]
fn start_then_stop_with_no_tasks_returns_promptly() -> AppResult<()> {
    let (done_tx, done_rx) = mpsc::channel();
    let handle = thread::spawn(move || -> Result<(), DispatchError> {
        let dispatcher = Dispatcher::new();
        dispatcher.start()?;
        dispatcher.stop();
        done_tx.send(()).ok();
        Ok(())
    });

    done_rx
        .recv_timeout(PROMPT_STOP_TIMEOUT)
        .map_err(|err| AppError::dispatch(format!("stop did not return: {}", err)))?;
    handle
        .join()
        .map_err(|_panic| AppError::dispatch("start/stop thread panicked"))??;
    Ok(())
}

#[test]
fn concurrent_producers_lose_no_tasks() -> AppResult<()> {
    let dispatcher = pool(3)?;
    let counter = Arc::new(AtomicUsize::new(0));
    dispatcher.start()?;

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..250 {
                    dispatcher.submit(counting_task(&counter));
                }
            });
        }
    });
    dispatcher.stop();

    expect_count(&counter, 2000)
}

#[test]
fn failing_tasks_do_not_stop_later_tasks() -> AppResult<()> {
    let dispatcher = pool(1)?;
    let counter = Arc::new(AtomicUsize::new(0));
    dispatcher.start()?;

    dispatcher.submit(Task::new(|| Err("request refused".into())));
    dispatcher.submit(Task::new(|| {
        std::panic::resume_unwind(Box::new("worker boom"));
    }));
    for _ in 0..50 {
        dispatcher.submit(counting_task(&counter));
    }
    dispatcher.stop();

    expect_count(&counter, 50)
}

#[test]
fn single_worker_dequeues_in_submission_order() -> AppResult<()> {
    let dispatcher = pool(1)?;
    let started = Arc::new(Mutex::new(Vec::new()));

    for index in 0..20_usize {
        let started = Arc::clone(&started);
        dispatcher.submit(Task::new(move || {
            started
                .lock()
                .map_err(|_poisoned| "order log poisoned")?
                .push(index);
            Ok(())
        }));
    }
    if dispatcher.pending() != 20 {
        return Err(AppError::dispatch("tasks should wait for start"));
    }

    dispatcher.start()?;
    dispatcher.stop();

    let order = started
        .lock()
        .map_err(|_poisoned| AppError::dispatch("order log poisoned"))?
        .clone();
    let expected: Vec<usize> = (0..20).collect();
    if order != expected {
        return Err(AppError::dispatch(format!("unexpected order {:?}", order)));
    }
    Ok(())
}

#[test]
fn second_start_is_rejected_while_running() -> AppResult<()> {
    let dispatcher = pool(2)?;
    dispatcher.start()?;

    match dispatcher.start() {
        Err(DispatchError::AlreadyRunning { workers: 2 }) => {}
        Err(err) => return Err(AppError::dispatch(format!("unexpected error: {}", err))),
        Ok(()) => return Err(AppError::dispatch("second start should fail")),
    }
    if dispatcher.worker_count() != 2 {
        return Err(AppError::dispatch("second start must not spawn workers"));
    }

    dispatcher.stop();
    Ok(())
}

#[test]
fn stop_is_idempotent() -> AppResult<()> {
    let dispatcher = pool(2)?;
    dispatcher.start()?;
    dispatcher.stop();
    dispatcher.stop();
    if dispatcher.is_running() {
        return Err(AppError::dispatch("dispatcher still running"));
    }
    Ok(())
}

#[test]
fn tasks_submitted_after_stop_run_on_restart() -> AppResult<()> {
    let dispatcher = pool(2)?;
    let counter = Arc::new(AtomicUsize::new(0));
    dispatcher.start()?;
    dispatcher.stop();

    for _ in 0..5 {
        dispatcher.submit(counting_task(&counter));
    }
    if dispatcher.pending() != 5 {
        return Err(AppError::dispatch("late tasks should stay queued"));
    }
    expect_count(&counter, 0)?;

    dispatcher.start()?;
    dispatcher.stop();
    expect_count(&counter, 5)
}

#[test]
fn submit_racing_stop_keeps_queue_consistent() -> AppResult<()> {
    let dispatcher = pool(2)?;
    let counter = Arc::new(AtomicUsize::new(0));
    dispatcher.start()?;

    thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..500 {
                dispatcher.submit(counting_task(&counter));
            }
        });
        dispatcher.stop();
    });

    let executed = counter.load(Ordering::SeqCst);
    let pending = dispatcher.pending();
    if executed.saturating_add(pending) != 500 {
        return Err(AppError::dispatch(format!(
            "executed {} + pending {} != 500",
            executed, pending
        )));
    }
    Ok(())
}

#[test]
fn dropping_dispatcher_drains_and_joins() -> AppResult<()> {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let dispatcher = pool(2)?;
        dispatcher.start()?;
        for _ in 0..64 {
            dispatcher.submit(counting_task(&counter));
        }
    }
    expect_count(&counter, 64)
}

#[test]
fn bounded_queue_blocks_producer_until_space_frees() -> AppResult<()> {
    let capacity = NonZeroUsize::new(1).ok_or_else(|| AppError::dispatch("zero capacity"))?;
    let dispatcher = Dispatcher::builder()
        .workers(NonZeroUsize::MIN)
        .capacity(QueueCapacity::Bounded(capacity))
        .build();
    let counter = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = mpsc::channel::<()>();
    dispatcher.start()?;

    let gate_counter = Arc::clone(&counter);
    dispatcher.submit(Task::new(move || {
        release_rx
            .recv()
            .map_err(|err| format!("release channel closed: {}", err))?;
        gate_counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    dispatcher.submit(counting_task(&counter));

    let producer_done = AtomicBool::new(false);
    thread::scope(|scope| -> AppResult<()> {
        scope.spawn(|| {
            dispatcher.submit(counting_task(&counter));
            producer_done.store(true, Ordering::SeqCst);
        });

        thread::sleep(BLOCKED_PRODUCER_SETTLE);
        let finished_early = producer_done.load(Ordering::SeqCst);
        release_tx
            .send(())
            .map_err(|err| AppError::dispatch(format!("release failed: {}", err)))?;
        if finished_early {
            return Err(AppError::dispatch("producer should block on a full queue"));
        }
        Ok(())
    })?;
    dispatcher.stop();

    expect_count(&counter, 3)
}

#[test]
fn bounded_submit_before_start_holds_tasks_without_blocking() -> AppResult<()> {
    let capacity = NonZeroUsize::new(1).ok_or_else(|| AppError::dispatch("zero capacity"))?;
    let dispatcher = Arc::new(
        Dispatcher::builder()
            .workers(NonZeroUsize::MIN)
            .capacity(QueueCapacity::Bounded(capacity))
            .build(),
    );
    let counter = Arc::new(AtomicUsize::new(0));
    let (done_tx, done_rx) = mpsc::channel();

    let producer = {
        let dispatcher = Arc::clone(&dispatcher);
        let counter = Arc::clone(&counter);
        thread::spawn(move || {
            for _ in 0..5 {
                dispatcher.submit(counting_task(&counter));
            }
            done_tx.send(()).ok();
        })
    };
    done_rx
        .recv_timeout(PROMPT_STOP_TIMEOUT)
        .map_err(|err| AppError::dispatch(format!("submit before start blocked: {}", err)))?;
    producer
        .join()
        .map_err(|_panic| AppError::dispatch("producer thread panicked"))?;
    if dispatcher.pending() != 5 {
        return Err(AppError::dispatch(format!(
            "expected 5 held tasks, got {}",
            dispatcher.pending()
        )));
    }

    dispatcher.start()?;
    dispatcher.stop();
    expect_count(&counter, 5)
}

#[test]
fn tasks_can_query_dispatcher_while_it_drains() -> AppResult<()> {
    let dispatcher = Arc::new(pool(1)?);
    let observed = Arc::new(Mutex::new(None));
    let (release_tx, release_rx) = mpsc::channel::<()>();
    dispatcher.start()?;

    dispatcher.submit(Task::new(move || {
        release_rx
            .recv()
            .map_err(|err| format!("release channel closed: {}", err))?;
        Ok(())
    }));
    let weak = Arc::downgrade(&dispatcher);
    let seen = Arc::clone(&observed);
    dispatcher.submit(Task::new(move || {
        let dispatcher = weak.upgrade().ok_or("dispatcher dropped")?;
        let worker_count = dispatcher.worker_count();
        let running = dispatcher.is_running();
        *seen.lock().map_err(|_poisoned| "observer poisoned")? = Some((worker_count, running));
        Ok(())
    }));

    let (done_tx, done_rx) = mpsc::channel();
    let stopper = {
        let dispatcher = Arc::clone(&dispatcher);
        thread::spawn(move || {
            dispatcher.stop();
            done_tx.send(()).ok();
        })
    };
    thread::sleep(BLOCKED_PRODUCER_SETTLE);
    release_tx
        .send(())
        .map_err(|err| AppError::dispatch(format!("release failed: {}", err)))?;

    done_rx
        .recv_timeout(PROMPT_STOP_TIMEOUT)
        .map_err(|err| AppError::dispatch(format!("stop did not return: {}", err)))?;
    stopper
        .join()
        .map_err(|_panic| AppError::dispatch("stop thread panicked"))?;

    let seen = *observed
        .lock()
        .map_err(|_poisoned| AppError::dispatch("observer poisoned"))?;
    match seen {
        Some((1, _running)) => Ok(()),
        other => Err(AppError::dispatch(format!(
            "unexpected observation {:?}",
            other
        ))),
    }
}

#[test]
fn task_outcome_captures_errors_and_panics() -> AppResult<()> {
    if Task::new(|| Ok(())).run() != TaskOutcome::Completed {
        return Err(AppError::dispatch("expected Completed"));
    }

    match Task::new(|| Err("endpoint unreachable".into())).run() {
        TaskOutcome::Failed(reason) if reason == "endpoint unreachable" => {}
        other => return Err(AppError::dispatch(format!("unexpected outcome {:?}", other))),
    }

    match Task::new(|| std::panic::resume_unwind(Box::new("kaboom"))).run() {
        TaskOutcome::Failed(reason) if reason.contains("kaboom") => {}
        other => return Err(AppError::dispatch(format!("unexpected outcome {:?}", other))),
    }
    Ok(())
}

#[test]
fn default_pool_matches_detected_parallelism() -> AppResult<()> {
    let dispatcher = Dispatcher::new();
    if dispatcher.pool_size() != detected_parallelism() {
        return Err(AppError::dispatch("pool size should follow parallelism"));
    }
    Ok(())
}
