use std::num::NonZeroUsize;
use std::time::Duration;

use crate::args::PositiveUsize;
use crate::http::RequestTemplate;

/// Hard ceiling on simultaneous requests per round.
pub const MAX_CONCURRENCY: usize = 5000;
/// Concurrency used by the load flow when the operator gives none.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Requests per round, always within `1..=MAX_CONCURRENCY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    pub const ONE: Self = Self(NonZeroUsize::MIN);

    /// Clamp an operator-supplied value into the allowed range.
    #[must_use]
    pub fn clamped(requested: u64) -> Self {
        let bounded = usize::try_from(requested)
            .unwrap_or(MAX_CONCURRENCY)
            .min(MAX_CONCURRENCY);
        NonZeroUsize::new(bounded).map_or(Self::ONE, Self)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

/// Everything the scheduler needs to run against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub url: String,
    pub concurrency: Concurrency,
    pub rounds: PositiveUsize,
    pub delay: Duration,
    pub cache_bust: bool,
    pub timeout: Duration,
}

impl RunPlan {
    /// Single request, single round: a quick reachability probe.
    #[must_use]
    pub const fn probe(url: String, timeout: Duration) -> Self {
        Self {
            url,
            concurrency: Concurrency::ONE,
            rounds: PositiveUsize::ONE,
            delay: Duration::ZERO,
            cache_bust: false,
            timeout,
        }
    }

    /// Operator-sized load run.
    #[must_use]
    pub const fn turbo(
        url: String,
        concurrency: Concurrency,
        rounds: PositiveUsize,
        delay: Duration,
        cache_bust: bool,
        timeout: Duration,
    ) -> Self {
        Self {
            url,
            concurrency,
            rounds,
            delay,
            cache_bust,
            timeout,
        }
    }

    #[must_use]
    pub fn template(&self) -> RequestTemplate {
        RequestTemplate::new(self.url.clone(), self.cache_bust, self.timeout)
    }
}
