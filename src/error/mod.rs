mod app;
mod config;
mod http;
mod metrics;
mod run;
mod sink;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::{FetchError, FetchErrorKind, HttpError};
pub use metrics::MetricsError;
pub use run::{RoundError, RunError};
pub use sink::SinkError;
pub use validation::ValidationError;
