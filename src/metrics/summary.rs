use std::collections::BTreeMap;
use std::time::Duration;

use tracing::warn;

use super::histogram::LatencyHistogram;
use super::types::{RequestOutcome, STATUS_OK, TestRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyPercentiles {
    pub p50: Duration,
    pub p90: Duration,
    pub p99: Duration,
}

/// Aggregate view of a run, recomputed from scratch every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_requests: u64,
    /// Keyed by status code; `None` counts transport failures.
    pub status_counts: BTreeMap<Option<u16>, u64>,
    pub success_count: u64,
    pub avg_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub total_bytes: u64,
    pub percentiles: Option<LatencyPercentiles>,
}

impl Summary {
    /// Successful share of all requests, scaled by 100 (e.g. 9950 = 99.50%).
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        if self.total_requests == 0 {
            return 0;
        }
        let scaled = u128::from(self.success_count)
            .saturating_mul(10_000)
            .checked_div(u128::from(self.total_requests))
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// Requests per second over `duration`, scaled by 100.
    #[must_use]
    pub fn requests_per_second_x100(&self, duration: Duration) -> u64 {
        if self.total_requests == 0 {
            return 0;
        }
        let duration_ms = duration.as_millis().max(1);
        let scaled = u128::from(self.total_requests)
            .saturating_mul(100_000)
            .checked_div(duration_ms)
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

/// Flatten every round of `run` and compute its summary.
#[must_use]
pub fn summarize(run: &TestRun) -> Summary {
    let mut status_counts: BTreeMap<Option<u16>, u64> = BTreeMap::new();
    let mut total_requests = 0u64;
    let mut total_bytes = 0u64;
    let mut latency_sum = 0u128;
    let mut min_latency: Option<Duration> = None;
    let mut max_latency = Duration::ZERO;

    for outcome in run.outcomes() {
        total_requests = total_requests.saturating_add(1);
        total_bytes = total_bytes.saturating_add(outcome.bytes());
        let counter = status_counts.entry(outcome.status()).or_insert(0);
        *counter = counter.saturating_add(1);

        let elapsed = outcome.elapsed();
        latency_sum = latency_sum.saturating_add(elapsed.as_nanos());
        min_latency = Some(min_latency.map_or(elapsed, |current| current.min(elapsed)));
        max_latency = max_latency.max(elapsed);
    }

    let avg_nanos = latency_sum
        .checked_div(u128::from(total_requests))
        .unwrap_or(0);
    let avg_latency = Duration::from_nanos(u64::try_from(avg_nanos).unwrap_or(u64::MAX));
    let success_count = status_counts.get(&Some(STATUS_OK)).copied().unwrap_or(0);

    Summary {
        total_requests,
        success_count,
        status_counts,
        avg_latency,
        min_latency: min_latency.unwrap_or(Duration::ZERO),
        max_latency,
        total_bytes,
        percentiles: latency_percentiles(run.outcomes()),
    }
}

fn latency_percentiles<'run>(
    outcomes: impl Iterator<Item = &'run RequestOutcome>,
) -> Option<LatencyPercentiles> {
    let mut histogram = match LatencyHistogram::new() {
        Ok(histogram) => histogram,
        Err(err) => {
            warn!("Latency percentiles unavailable: {}", err);
            return None;
        }
    };
    for outcome in outcomes {
        if let Err(err) = histogram.record(outcome.elapsed()) {
            warn!("Latency percentiles unavailable: {}", err);
            return None;
        }
    }
    if histogram.count() == 0 {
        return None;
    }
    let (p50, p90, p99) = histogram.percentiles();
    Some(LatencyPercentiles { p50, p90, p99 })
}
