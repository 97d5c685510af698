use std::sync::Arc;

use reqwest::{Client, StatusCode};
use tokio::runtime::Handle;
use tracing::debug;
use url::Url;

use crate::{
    args::BarrageArgs,
    dispatcher::{Task, TaskResult},
    error::{AppResult, HttpError, TaskError},
};

use super::{RequestStats, build_client, resolve_payload, resolve_url};

/// The single endpoint every load task posts to.
///
/// Workers are plain OS threads; each request is driven to completion on the
/// runtime behind `handle`.
#[derive(Debug)]
pub struct RequestTarget {
    client: Client,
    url: Url,
    payload: String,
    stats: Arc<RequestStats>,
    handle: Handle,
}

impl RequestTarget {
    /// Builds the client, URL and payload from the resolved arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is missing or invalid, TLS material
    /// cannot be loaded, or the payload file cannot be read.
    pub fn from_args(args: &BarrageArgs, handle: Handle) -> AppResult<Self> {
        let url = resolve_url(args.endpoint.as_deref(), &args.path)?;
        let payload = resolve_payload(args)?;
        let client = build_client(args)?;
        Ok(Self {
            client,
            url,
            payload,
            stats: Arc::new(RequestStats::new()),
            handle,
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn stats(&self) -> Arc<RequestStats> {
        Arc::clone(&self.stats)
    }

    /// Sends one POST and classifies the response.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailed` on transport errors and `UnexpectedStatus` for
    /// any non-2xx response.
    pub async fn post(&self) -> Result<StatusCode, HttpError> {
        self.stats.record_attempt();
        let response = match self
            .client
            .post(self.url.clone())
            .body(self.payload.clone())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.stats.record_error();
                return Err(HttpError::RequestFailed { source: err });
            }
        };

        let status = response.status();
        // Read the body so the connection goes back to the pool.
        if let Err(err) = response.bytes().await {
            debug!("Failed to read response body: {}", err);
        }

        if status.is_success() {
            self.stats.record_success();
            debug!("{} -> {}", self.url, status);
            Ok(status)
        } else {
            self.stats.record_non_success();
            Err(HttpError::UnexpectedStatus { status })
        }
    }

    /// Runs [`post`](Self::post) to completion from a non-async thread.
    ///
    /// A non-2xx response is already counted in the stats and only logged at
    /// debug level here.
    ///
    /// # Errors
    ///
    /// Returns transport failures as a `TaskError`.
    pub fn post_blocking(&self) -> TaskResult {
        match self.handle.block_on(self.post()) {
            Ok(_status) => Ok(()),
            Err(HttpError::UnexpectedStatus { status }) => {
                debug!("{} -> {}", self.url, status);
                Ok(())
            }
            Err(err) => Err(TaskError::from(err)),
        }
    }

    /// Wraps one request as a dispatcher task.
    #[must_use]
    pub fn task(self: &Arc<Self>) -> Task {
        let target = Arc::clone(self);
        Task::new(move || target.post_blocking())
    }
}
