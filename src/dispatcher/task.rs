use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::TaskError;

pub type TaskResult = Result<(), TaskError>;

type Job = Box<dyn FnOnce() -> TaskResult + Send + 'static>;

/// An argumentless unit of work.
///
/// A task is owned by the queue until a worker removes it, and is then run
/// exactly once by that worker. It is never re-queued, even when it fails.
pub struct Task {
    job: Job,
}

impl Task {
    #[must_use]
    pub fn new<F>(job: F) -> Self
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        Self { job: Box::new(job) }
    }

    /// Runs the job, turning a returned error or a panic into `Failed`.
    pub(crate) fn run(self) -> TaskOutcome {
        match catch_unwind(AssertUnwindSafe(self.job)) {
            Ok(Ok(())) => TaskOutcome::Completed,
            Ok(Err(err)) => TaskOutcome::Failed(err.to_string()),
            Err(payload) => TaskOutcome::Failed(format!(
                "task panicked: {}",
                panic_message(payload.as_ref())
            )),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(String),
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
