use std::sync::atomic::{AtomicU64, Ordering};

/// Request counters shared by every worker.
///
/// `attempts` is bumped before the request goes out, so after a drain it
/// equals the number of tasks that started a request.
#[derive(Debug, Default)]
pub struct RequestStats {
    attempts: AtomicU64,
    successes: AtomicU64,
    non_success: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of [`RequestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub non_success: u64,
    pub errors: u64,
}

impl RequestStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_non_success(&self) {
        self.non_success.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            non_success: self.non_success.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Requests that have started but not yet been classified.
    #[must_use]
    pub const fn in_flight(&self) -> u64 {
        self.attempts
            .saturating_sub(self.successes)
            .saturating_sub(self.non_success)
            .saturating_sub(self.errors)
    }
}
