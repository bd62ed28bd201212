use std::time::Duration;

pub const STATUS_OK: u16 = 200;
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Fallback text used when a failure arrives without a description.
const UNKNOWN_FAILURE: &str = "request failed";

/// Terminal result of one request attempt.
///
/// A missing status always comes with a non-empty error and zero bytes; a
/// present status always comes with an empty error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    index: usize,
    status: Option<u16>,
    bytes: u64,
    elapsed: Duration,
    error: String,
}

impl RequestOutcome {
    #[must_use]
    pub const fn success(index: usize, status: u16, bytes: u64, elapsed: Duration) -> Self {
        Self {
            index,
            status: Some(status),
            bytes,
            elapsed,
            error: String::new(),
        }
    }

    #[must_use]
    pub fn failure(index: usize, elapsed: Duration, error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            UNKNOWN_FAILURE.to_owned()
        } else {
            error
        };
        Self {
            index,
            status: None,
            bytes: 0,
            elapsed,
            error,
        }
    }

    /// 1-based position of the request within its round.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn error(&self) -> &str {
        &self.error
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status.is_none()
    }
}

/// Quick per-round counters printed after each round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTally {
    pub success: usize,
    pub rate_limited: usize,
    pub errors: usize,
}

/// All outcomes of one round, ordered by request index (1..=C).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    outcomes: Vec<RequestOutcome>,
}

impl RoundResult {
    #[must_use]
    pub const fn new(outcomes: Vec<RequestOutcome>) -> Self {
        Self { outcomes }
    }

    /// Degenerate round where every slot carries the same orchestration failure.
    #[must_use]
    pub fn failed(concurrency: usize, error: &str) -> Self {
        let outcomes = (1..=concurrency)
            .map(|index| RequestOutcome::failure(index, Duration::ZERO, error))
            .collect();
        Self { outcomes }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[RequestOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn tally(&self) -> RoundTally {
        let mut tally = RoundTally::default();
        for outcome in &self.outcomes {
            match outcome.status {
                Some(STATUS_OK) => tally.success = tally.success.saturating_add(1),
                Some(STATUS_TOO_MANY_REQUESTS) => {
                    tally.rate_limited = tally.rate_limited.saturating_add(1);
                }
                Some(_) => {}
                None => tally.errors = tally.errors.saturating_add(1),
            }
        }
        tally
    }
}

/// Every round of one run against a single target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    pub url: String,
    pub rounds: Vec<RoundResult>,
    pub duration: Duration,
}

impl TestRun {
    /// Flattened outcomes in round order.
    pub fn outcomes(&self) -> impl Iterator<Item = &RequestOutcome> {
        self.rounds.iter().flat_map(|round| round.outcomes.iter())
    }

    /// Outcomes paired with their 1-based round number.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &RequestOutcome)> {
        self.rounds.iter().enumerate().flat_map(|(position, round)| {
            let round_number = position.saturating_add(1);
            round
                .outcomes
                .iter()
                .map(move |outcome| (round_number, outcome))
        })
    }
}
