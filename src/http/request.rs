use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::seq::SliceRandom;
use rand::thread_rng;

use super::fetcher::OutboundRequest;

/// User-Agent values rotated across requests.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (X11; Linux x86_64)",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X)",
];

/// Used only if the rotation list cannot produce a value.
const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64)";

/// Query parameter carrying the cache-busting timestamp.
pub const CACHE_BUST_PARAM: &str = "_";

/// Per-round description of the request every task sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    url: String,
    cache_bust: bool,
    timeout: Duration,
}

impl RequestTemplate {
    #[must_use]
    pub const fn new(url: String, cache_bust: bool, timeout: Duration) -> Self {
        Self {
            url,
            cache_bust,
            timeout,
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the template for the request at `index`, picking a fresh
    /// User-Agent and (when enabled) a fresh cache-busting stamp.
    #[must_use]
    pub fn build(&self, index: usize) -> OutboundRequest {
        let url = if self.cache_bust {
            cache_busted_url(&self.url, timestamp_nanos())
        } else {
            self.url.clone()
        };

        OutboundRequest {
            index,
            url,
            headers: vec![("User-Agent".to_owned(), random_user_agent().to_owned())],
            timeout: self.timeout,
        }
    }
}

/// Append `_=<stamp>` using `&` when the URL already carries a query.
#[must_use]
pub fn cache_busted_url(url: &str, stamp: u128) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, CACHE_BUST_PARAM, stamp)
}

fn timestamp_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos())
}

fn random_user_agent() -> &'static str {
    let mut rng = thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(FALLBACK_USER_AGENT)
}
