use thiserror::Error;

use super::HttpError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Dispatcher is already running with {workers} workers.")]
    AlreadyRunning { workers: usize },
    #[error("Failed to spawn worker {index}: {source}")]
    SpawnWorker {
        index: usize,
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

/// Failure reported by a unit of work. Contained by the worker that ran it.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("{0}")]
    Message(String),
}

impl From<&'static str> for TaskError {
    fn from(message: &'static str) -> Self {
        TaskError::Message(message.to_owned())
    }
}

impl From<String> for TaskError {
    fn from(message: String) -> Self {
        TaskError::Message(message)
    }
}
