use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use super::queue::TaskQueue;
use super::task::TaskOutcome;

const WORKER_NAME_PREFIX: &str = "barrage-worker";

/// One pool thread: waits for tasks, runs them unlocked, and exits once the
/// queue is shut down and empty.
struct Worker {
    index: usize,
    queue: Arc<TaskQueue>,
}

impl Worker {
    fn run(&self) {
        debug!(worker = self.index, "worker started");
        let mut executed: u64 = 0;
        let mut failed: u64 = 0;

        while let Some(task) = self.queue.next() {
            if let TaskOutcome::Failed(reason) = task.run() {
                failed = failed.saturating_add(1);
                warn!(worker = self.index, "task failed: {}", reason);
            }
            executed = executed.saturating_add(1);
        }

        debug!(worker = self.index, executed, failed, "worker stopped");
    }
}

#[derive(Debug)]
pub(crate) struct WorkerHandle {
    name: String,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    pub(crate) fn spawn(index: usize, queue: Arc<TaskQueue>) -> io::Result<Self> {
        let name = format!("{}-{}", WORKER_NAME_PREFIX, index);
        let worker = Worker { index, queue };
        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker.run())?;
        Ok(Self { name, thread })
    }

    pub(crate) fn join(self) {
        if self.thread.join().is_err() {
            error!("{} terminated abnormally", self.name);
        }
    }
}
