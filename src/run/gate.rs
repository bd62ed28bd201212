use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Default)]
struct GateCounters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Bounds how many requests may hold a slot at once.
///
/// Waiters are admitted in FIFO order. A slot is released when its
/// [`GatePermit`] drops, on every exit path.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    permits: Arc<Semaphore>,
    counters: Arc<GateCounters>,
    limit: usize,
}

impl ConcurrencyGate {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            counters: Arc::new(GateCounters::default()),
            limit,
        }
    }

    /// Wait for a free slot.
    ///
    /// # Errors
    ///
    /// Returns an error only if the gate has been closed.
    pub async fn acquire(&self) -> Result<GatePermit, AcquireError> {
        let permit = Arc::clone(&self.permits).acquire_owned().await?;
        let now = self
            .counters
            .in_flight
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1);
        self.counters.peak.fetch_max(now, Ordering::AcqRel);
        Ok(GatePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        })
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Slots currently held.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of slots ever held at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak.load(Ordering::Acquire)
    }
}

/// A held gate slot.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<GateCounters>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
