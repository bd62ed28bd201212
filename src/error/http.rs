use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}

/// Coarse classification of a transport-level request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Connect,
    Body,
    Request,
}

impl FetchErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Connect => "connect",
            FetchErrorKind::Body => "body",
            FetchErrorKind::Request => "request",
        }
    }
}

/// Failure of a single fetch. The rendered message is never empty.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    #[must_use]
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "request failed".to_owned()
        } else {
            message
        };
        Self { kind, message }
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if err.is_connect() {
            FetchErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            FetchErrorKind::Body
        } else {
            FetchErrorKind::Request
        };
        Self::new(kind, err.to_string())
    }
}
