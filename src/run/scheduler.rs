use std::sync::Arc;

use tokio::time::Instant;
use tracing::info;

use crate::error::RunError;
use crate::http::Transport;
use crate::metrics::TestRun;
use crate::shutdown::{ShutdownReceiver, shutdown_requested};

use super::dispatcher::RoundDispatcher;
use super::plan::RunPlan;
use super::progress::ProgressObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running { round: usize, of: usize },
    Completed,
    Cancelled,
}

/// Runs the planned rounds one after another.
pub struct RoundScheduler {
    plan: RunPlan,
    dispatcher: RoundDispatcher,
    observer: Arc<dyn ProgressObserver>,
    state: SchedulerState,
}

impl RoundScheduler {
    #[must_use]
    pub fn new(
        plan: RunPlan,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            plan,
            dispatcher: RoundDispatcher::new(transport, Arc::clone(&observer)),
            observer,
            state: SchedulerState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub const fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Execute every round, sleeping `plan.delay` between rounds.
    ///
    /// The returned duration spans the first dispatch to the end of the last
    /// round, delays included.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Cancelled`] when shutdown is signalled; in-flight
    /// requests are aborted and completed rounds are discarded.
    pub async fn run(&mut self, shutdown_rx: &mut ShutdownReceiver) -> Result<TestRun, RunError> {
        let template = self.plan.template();
        let total = self.plan.rounds.get();
        let concurrency = self.plan.concurrency;
        let mut rounds = Vec::with_capacity(total);

        info!(
            url = %self.plan.url,
            concurrency = concurrency.get(),
            rounds = total,
            delay_ms = self.plan.delay.as_millis(),
            cache_bust = self.plan.cache_bust,
            "starting run"
        );
        let start = Instant::now();

        for round in 1..=total {
            self.state = SchedulerState::Running { round, of: total };
            self.observer.round_started(round, total);

            let dispatched = tokio::select! {
                biased;
                () = shutdown_requested(shutdown_rx) => None,
                result = self.dispatcher.dispatch(&template, concurrency) => Some(result),
            };
            let Some(result) = dispatched else {
                return Err(self.cancel(rounds.len()));
            };

            let tally = result.tally();
            info!(
                round,
                success = tally.success,
                rate_limited = tally.rate_limited,
                errors = tally.errors,
                "round completed"
            );
            self.observer.round_completed(round, &tally);
            rounds.push(result);

            if round < total && !self.plan.delay.is_zero() {
                let interrupted = tokio::select! {
                    biased;
                    () = shutdown_requested(shutdown_rx) => true,
                    () = tokio::time::sleep(self.plan.delay) => false,
                };
                if interrupted {
                    return Err(self.cancel(rounds.len()));
                }
            }
        }

        let duration = start.elapsed();
        self.state = SchedulerState::Completed;
        info!(duration_ms = duration.as_millis(), "run completed");

        Ok(TestRun {
            url: self.plan.url.clone(),
            rounds,
            duration,
        })
    }

    fn cancel(&mut self, completed_rounds: usize) -> RunError {
        self.state = SchedulerState::Cancelled;
        info!(completed_rounds, "run cancelled");
        RunError::Cancelled { completed_rounds }
    }
}
