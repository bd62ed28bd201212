use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::RoundError;
use crate::http::{RequestTemplate, Transport, execute_request};
use crate::metrics::{RequestOutcome, RoundResult};

use super::gate::ConcurrencyGate;
use super::plan::Concurrency;
use super::progress::ProgressObserver;

/// Fans one round of requests out through a shared gate.
#[derive(Clone)]
pub struct RoundDispatcher {
    transport: Arc<dyn Transport>,
    observer: Arc<dyn ProgressObserver>,
}

impl RoundDispatcher {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            transport,
            observer,
        }
    }

    /// Issue `concurrency` requests, gated at `concurrency` in flight, and
    /// return their outcomes in dispatch order.
    pub async fn dispatch(
        &self,
        template: &RequestTemplate,
        concurrency: Concurrency,
    ) -> RoundResult {
        let gate = ConcurrencyGate::new(concurrency.get());
        self.dispatch_gated(template, concurrency, &gate).await
    }

    /// Same as [`RoundDispatcher::dispatch`] with a caller-supplied gate.
    ///
    /// Orchestration failures never escape: they turn into a round where every
    /// request failed with the orchestration error.
    pub async fn dispatch_gated(
        &self,
        template: &RequestTemplate,
        concurrency: Concurrency,
        gate: &ConcurrencyGate,
    ) -> RoundResult {
        match self.try_dispatch(template, concurrency.get(), gate).await {
            Ok(round) => round,
            Err(err) => {
                warn!("Round orchestration failed: {}", err);
                RoundResult::failed(concurrency.get(), &err.to_string())
            }
        }
    }

    async fn try_dispatch(
        &self,
        template: &RequestTemplate,
        count: usize,
        gate: &ConcurrencyGate,
    ) -> Result<RoundResult, RoundError> {
        let fetcher = self
            .transport
            .open_session(count)
            .map_err(|source| RoundError::OpenSession { source })?;

        let mut tasks = JoinSet::new();
        for index in 1..=count {
            let request = template.build(index);
            let fetcher = Arc::clone(&fetcher);
            let observer = Arc::clone(&self.observer);
            let gate = gate.clone();
            tasks.spawn(async move {
                match gate.acquire().await {
                    Ok(_permit) => {
                        execute_request(fetcher.as_ref(), &request, observer.as_ref()).await
                    }
                    Err(err) => {
                        let outcome = RequestOutcome::failure(index, Duration::ZERO, err.to_string());
                        observer.request_completed(&outcome);
                        outcome
                    }
                }
            });
        }
        debug!(count, limit = gate.limit(), "round dispatched");

        collect_in_order(tasks, count).await
    }
}

/// Drain `tasks` and place each outcome at its request index. Dropping the set
/// early (error or cancellation) aborts whatever is still running.
async fn collect_in_order(
    mut tasks: JoinSet<RequestOutcome>,
    expected: usize,
) -> Result<RoundResult, RoundError> {
    let mut slots: Vec<Option<RequestOutcome>> =
        std::iter::repeat_with(|| None).take(expected).collect();

    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(source) => {
                let discarded = slots.iter().filter(|slot| slot.is_some()).count();
                warn!(
                    discarded,
                    "Request task failed; outcomes already reported for this round are discarded"
                );
                return Err(RoundError::Join { source });
            }
        };
        let index = outcome.index();
        let slot = index
            .checked_sub(1)
            .and_then(|position| slots.get_mut(position))
            .ok_or(RoundError::IndexOutOfRange { index })?;
        *slot = Some(outcome);
    }

    let mut outcomes = Vec::with_capacity(expected);
    for (position, slot) in slots.into_iter().enumerate() {
        let outcome = slot.ok_or(RoundError::MissingOutcome {
            index: position.saturating_add(1),
        })?;
        outcomes.push(outcome);
    }
    Ok(RoundResult::new(outcomes))
}
