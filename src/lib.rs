//! Core library for the `barrage` CLI.
//!
//! The heart of the crate is [`dispatcher`]: a fixed pool of worker threads
//! fed by a FIFO queue, with a drain-to-completion shutdown. Around it sit
//! the CLI argument types, configuration loading, and the HTTP target each
//! load task posts to. The primary user-facing interface is the `barrage`
//! command-line application; library APIs may evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
