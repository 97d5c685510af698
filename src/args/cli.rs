use clap::Parser;
use std::time::Duration;

use super::defaults::{DEFAULT_PATH, DEFAULT_PAYLOAD};
use super::parsers::{parse_duration_arg, parse_header, parse_positive_usize};
use super::types::PositiveUsize;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Continuous HTTPS load generator: a fixed pool of worker threads POSTs to one endpoint until interrupted, then drains and reports the request count."
)]
pub struct BarrageArgs {
    /// Base URL of the target (e.g. https://ingress.example.com)
    #[arg(long, short = 'e', env = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Path appended to the endpoint for every request
    #[arg(long, default_value = DEFAULT_PATH)]
    pub path: String,

    /// CA bundle (PEM) used to verify the server
    #[arg(long, env = "CA")]
    pub cacert: Option<String>,

    /// Client certificate (PEM) for mutual TLS
    #[arg(long, env = "CERT")]
    pub cert: Option<String>,

    /// Client private key (PKCS#8 PEM) for mutual TLS
    #[arg(long, env = "CERT_KEY")]
    pub key: Option<String>,

    /// Accept invalid server certificates and hostnames
    #[arg(long)]
    pub insecure: bool,

    /// Request body sent with every POST
    #[arg(long, short, default_value = DEFAULT_PAYLOAD, hide_default_value = true)]
    pub data: String,

    /// Request body read from a file
    #[arg(long = "data-file", short = 'D', conflicts_with = "data")]
    pub data_file: Option<String>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Delay between submissions (supports ms/s/m/h)
    #[arg(long, short = 'i', default_value = "1ms", value_parser = parse_duration_arg)]
    pub interval: Duration,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Worker threads (default: available parallelism)
    #[arg(long, short = 'w', value_parser = parse_positive_usize)]
    pub workers: Option<PositiveUsize>,

    /// Maximum queued requests before submission blocks (default: unbounded)
    #[arg(long = "queue-capacity", value_parser = parse_positive_usize)]
    pub queue_capacity: Option<PositiveUsize>,

    /// Stop on its own after this long (supports ms/s/m/h; default: run until interrupted)
    #[arg(long, short = 't', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Interval between progress log lines (supports ms/s/m/h)
    #[arg(long = "report-interval", default_value = "5s", value_parser = parse_duration_arg)]
    pub report_interval: Duration,

    /// Path to config file (TOML/JSON). Defaults to ./barrage.toml or ./barrage.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by BARRAGE_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Skip the startup banner
    #[arg(long, short = 'q')]
    pub quiet: bool,
}
