mod app;
mod config;
mod dispatch;
mod http;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use dispatch::{DispatchError, TaskError};
pub use http::HttpError;
pub use validation::ValidationError;
