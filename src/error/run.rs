use thiserror::Error;

use super::HttpError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Run cancelled after {completed_rounds} completed round(s).")]
    Cancelled { completed_rounds: usize },
}

/// Failure of the fan-out machinery for one round, as opposed to a failure of
/// an individual request.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error("Failed to open HTTP session: {source}")]
    OpenSession {
        #[source]
        source: HttpError,
    },
    #[error("Request task failed to join: {source}")]
    Join {
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Request task returned out-of-range index {index}.")]
    IndexOutOfRange { index: usize },
    #[error("No outcome was produced for request {index}.")]
    MissingOutcome { index: usize },
}
