//! Round orchestration: admission gate, per-round fan-out, and the
//! multi-round scheduler.
mod dispatcher;
mod gate;
mod plan;
mod progress;
mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::RoundDispatcher;
pub use gate::{ConcurrencyGate, GatePermit};
pub use plan::{Concurrency, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, MAX_CONCURRENCY, RunPlan};
pub use progress::{ProgressObserver, SilentProgress};
pub use scheduler::{RoundScheduler, SchedulerState};
