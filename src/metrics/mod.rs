//! Per-request outcomes, round/run containers, and summary aggregation.
mod format;
mod histogram;
mod summary;
mod types;


pub use format::{format_millis, format_x100};
pub use histogram::LatencyHistogram;
pub use summary::{LatencyPercentiles, Summary, summarize};
pub use types::{
    RequestOutcome, RoundResult, RoundTally, STATUS_OK, STATUS_TOO_MANY_REQUESTS, TestRun,
};
