//! HTTP transport for the load loop: client construction, the request
//! target every task posts to, and the shared request counters.
mod client;
mod stats;
mod target;


pub use stats::{RequestStats, StatsSnapshot};
pub use target::RequestTarget;

pub(crate) use client::{build_client, resolve_payload, resolve_url};
