use std::time::Duration;

use serde::Deserialize;

use crate::args::{RunMode, parse_delay, parse_duration_arg};
use crate::error::ValidationError;

/// File counterpart of the CLI options. Every field is optional; command-line
/// values win.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub mode: Option<RunMode>,
    pub concurrency: Option<u64>,
    pub rounds: Option<usize>,
    pub delay: Option<DurationValue>,
    pub cache_bust: Option<bool>,
    pub timeout: Option<DurationValue>,
    pub output_dir: Option<String>,
    pub export_json: Option<String>,
    pub quiet: Option<bool>,
    pub authorized: Option<bool>,
}

/// Either a bare number or a string with a unit suffix (`"250ms"`, `"2s"`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Number(u64),
    Text(String),
}

impl DurationValue {
    /// Bare numbers are milliseconds; zero is allowed.
    pub(crate) fn to_delay(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Number(millis) => Ok(Duration::from_millis(*millis)),
            DurationValue::Text(text) => parse_delay(text),
        }
    }

    /// Bare numbers are seconds; must be positive.
    pub(crate) fn to_timeout(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Number(0) => Err(ValidationError::DurationZero),
            DurationValue::Number(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
