use crate::metrics::{RequestOutcome, RoundTally};

/// Receives live progress from the core. Purely observational.
pub trait ProgressObserver: Send + Sync {
    fn round_started(&self, round: usize, total: usize) {
        let _ = (round, total);
    }

    fn request_completed(&self, outcome: &RequestOutcome);

    fn round_completed(&self, round: usize, tally: &RoundTally) {
        let _ = (round, tally);
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn request_completed(&self, _outcome: &RequestOutcome) {}
}
