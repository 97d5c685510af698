use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::task::Task;

/// How many tasks the queue may hold before `submit` blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueCapacity {
    /// Never blocks the producer. The driving loop's cadence is the only throttle.
    #[default]
    Unbounded,
    /// Blocks the producer while the queue is full and the dispatcher is running.
    Bounded(NonZeroUsize),
}

impl QueueCapacity {
    const fn is_full(self, len: usize) -> bool {
        match self {
            QueueCapacity::Unbounded => false,
            QueueCapacity::Bounded(limit) => len >= limit.get(),
        }
    }

    #[must_use]
    pub const fn is_bounded(self) -> bool {
        matches!(self, QueueCapacity::Bounded(_))
    }
}

#[derive(Debug)]
struct QueueState {
    tasks: VecDeque<Task>,
    running: bool,
}

/// FIFO of pending tasks plus the running flag, guarded by one mutex.
///
/// The condvar is shared by idle workers (waiting for work or shutdown) and,
/// under a bounded capacity, by producers waiting for room.
#[derive(Debug)]
pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,
    signal: Condvar,
    capacity: QueueCapacity,
}

impl TaskQueue {
    pub(crate) fn new(capacity: QueueCapacity) -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                running: false,
            }),
            signal: Condvar::new(),
            capacity,
        }
    }

    // Tasks never run under the lock, so a poisoned guard still holds a
    // consistent queue.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'guard>(
        &self,
        guard: MutexGuard<'guard, QueueState>,
    ) -> MutexGuard<'guard, QueueState> {
        self.signal
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, task: Task) {
        let mut state = self.lock();
        while state.running && self.capacity.is_full(state.tasks.len()) {
            state = self.wait(state);
        }
        state.tasks.push_back(task);
        drop(state);
        self.signal.notify_all();
    }

    /// Blocks until a task is available, or returns `None` once the queue has
    /// been shut down and fully drained.
    pub(crate) fn next(&self) -> Option<Task> {
        let mut state = self.lock();
        while state.running && state.tasks.is_empty() {
            state = self.wait(state);
        }
        let task = state.tasks.pop_front();
        drop(state);
        if task.is_some() && self.capacity.is_bounded() {
            self.signal.notify_all();
        }
        task
    }

    /// Sets the running flag and wakes every waiter. Returns the previous value.
    pub(crate) fn set_running(&self, running: bool) -> bool {
        let mut state = self.lock();
        let previous = std::mem::replace(&mut state.running, running);
        drop(state);
        self.signal.notify_all();
        previous
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lock().running
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().tasks.len()
    }
}
