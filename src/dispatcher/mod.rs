//! Fixed-size worker-thread pool fed by a FIFO task queue.
//!
//! A [`Dispatcher`] accepts [`Task`]s from any number of producer threads and
//! runs each one exactly once on one of its workers. Shutdown drains: every
//! task queued before [`Dispatcher::stop`] begins has run by the time `stop`
//! returns.
mod queue;
mod task;
mod worker;

#[cfg(test)]
mod tests;

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, info, warn};

use crate::error::DispatchError;

pub use queue::QueueCapacity;
pub use task::{Task, TaskOutcome, TaskResult};

use queue::TaskQueue;
use worker::WorkerHandle;

/// Pool size derived from the host's available parallelism, never below one.
#[must_use]
pub fn detected_parallelism() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatcherBuilder {
    workers: Option<NonZeroUsize>,
    capacity: QueueCapacity,
}

impl DispatcherBuilder {
    #[must_use]
    pub const fn workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = Some(workers);
        self
    }

    #[must_use]
    pub const fn capacity(mut self, capacity: QueueCapacity) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            queue: Arc::new(TaskQueue::new(self.capacity)),
            pool_size: self.workers.unwrap_or_else(detected_parallelism),
            workers: Mutex::new(Vec::new()),
            live: AtomicUsize::new(0),
        }
    }
}

/// Owns the task queue, the running flag and the worker threads.
///
/// Tasks submitted before [`start`](Self::start) are held and run once the
/// workers come up. Tasks submitted concurrently with or after
/// [`stop`](Self::stop) may or may not run: they stay queued for the next
/// `start`, and are dropped with a warning if the dispatcher is dropped first.
#[derive(Debug)]
pub struct Dispatcher {
    queue: Arc<TaskQueue>,
    pool_size: NonZeroUsize,
    workers: Mutex<Vec<WorkerHandle>>,
    // Readable without the `workers` lock, which `stop` holds while joining.
    live: AtomicUsize,
}

impl Dispatcher {
    /// Dispatcher sized to the detected hardware parallelism.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn with_workers(workers: NonZeroUsize) -> Self {
        Self::builder().workers(workers).build()
    }

    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    #[must_use]
    pub const fn pool_size(&self) -> NonZeroUsize {
        self.pool_size
    }

    /// Spawns exactly `pool_size` workers.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::AlreadyRunning`] when workers are already live,
    /// and [`DispatchError::SpawnWorker`] when a thread cannot be spawned. On a
    /// spawn failure the workers started so far are stopped and joined first.
    pub fn start(&self) -> Result<(), DispatchError> {
        let mut workers = self.lock_workers();
        if !workers.is_empty() {
            return Err(DispatchError::AlreadyRunning {
                workers: workers.len(),
            });
        }

        self.queue.set_running(true);
        let size = self.pool_size.get();
        workers.reserve(size);
        for index in 0..size {
            match WorkerHandle::spawn(index, Arc::clone(&self.queue)) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    error!("Failed to spawn worker {}: {}", index, source);
                    self.queue.set_running(false);
                    for handle in workers.drain(..) {
                        handle.join();
                    }
                    return Err(DispatchError::SpawnWorker { index, source });
                }
            }
        }

        self.live.store(size, Ordering::Release);
        info!("Dispatcher started with {} workers", size);
        Ok(())
    }

    /// Queues a task and wakes idle workers.
    ///
    /// Never blocks beyond the queue's critical section unless the dispatcher
    /// was built with a bounded [`QueueCapacity`], the queue is full and
    /// workers are running. Before `start` and after `stop` it never waits.
    pub fn submit(&self, task: Task) {
        self.queue.push(task);
    }

    /// Clears the running flag, wakes every worker and joins them all.
    ///
    /// Workers drain the queue before exiting, so every task queued before this
    /// call has run when it returns. Calling `stop` again is a no-op. Neither
    /// `stop` nor `start` may be called from inside a task; the read-only
    /// accessors may.
    pub fn stop(&self) {
        let mut workers = self.lock_workers();
        self.queue.set_running(false);
        if workers.is_empty() {
            return;
        }

        info!(
            "Stopping {} workers, draining {} queued tasks",
            workers.len(),
            self.queue.len()
        );
        for handle in workers.drain(..) {
            handle.join();
        }
        self.live.store(0, Ordering::Release);
        info!("Dispatcher stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.queue.is_running() && self.worker_count() > 0
    }

    /// Number of live worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Number of tasks waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<WorkerHandle>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
        let abandoned = self.queue.len();
        if abandoned > 0 {
            warn!("Dropping dispatcher with {} unexecuted tasks", abandoned);
        }
    }
}
