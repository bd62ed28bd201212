use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, HttpError};
use crate::http::{FetchResponse, Fetcher, OutboundRequest, Transport};
use crate::metrics::{RequestOutcome, RoundTally};

use super::progress::ProgressObserver;

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Scripted reply for one request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) delay: Duration,
    pub(crate) result: Result<FetchResponse, FetchError>,
    pub(crate) crash: bool,
}

impl Reply {
    pub(crate) const fn ok(status: u16, bytes: u64) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(FetchResponse { status, bytes }),
            crash: false,
        }
    }

    pub(crate) fn timeout() -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(FetchError::timeout("operation timed out")),
            crash: false,
        }
    }

    /// The request task unwinds instead of returning.
    pub(crate) fn crash() -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(FetchError::timeout("unreachable")),
            crash: true,
        }
    }

    pub(crate) const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Script = dyn Fn(usize, &OutboundRequest) -> Reply + Send + Sync;

#[derive(Debug, Default)]
struct Counters {
    sessions: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requests: AtomicUsize,
}

/// In-memory transport. The script receives the 1-based session number and
/// the request.
#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    script: Arc<Script>,
    counters: Arc<Counters>,
    fail_sessions: bool,
    seen_urls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(usize, &OutboundRequest) -> Reply + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            counters: Arc::new(Counters::default()),
            fail_sessions: false,
            seen_urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing_sessions() -> Self {
        let mut transport = Self::new(|_, _| Reply::ok(200, 0));
        transport.fail_sessions = true;
        transport
    }

    pub(crate) fn sessions_opened(&self) -> usize {
        self.counters.sessions.load(Ordering::Acquire)
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.counters.peak.load(Ordering::Acquire)
    }

    pub(crate) fn requests_seen(&self) -> usize {
        self.counters.requests.load(Ordering::Acquire)
    }

    pub(crate) fn seen_urls(&self) -> Vec<String> {
        self.seen_urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for ScriptedTransport {
    fn open_session(&self, _pool_size: usize) -> Result<Arc<dyn Fetcher>, HttpError> {
        if self.fail_sessions
            && let Some(source) = invalid_client_error()
        {
            return Err(HttpError::BuildClientFailed { source });
        }
        let session = self
            .counters
            .sessions
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1);
        Ok(Arc::new(ScriptedSession {
            session,
            transport: self.clone(),
        }))
    }
}

/// A control character makes the User-Agent header invalid, so the builder
/// fails without touching the network.
fn invalid_client_error() -> Option<reqwest::Error> {
    reqwest::Client::builder()
        .user_agent("bad\nagent")
        .build()
        .err()
}

struct ScriptedSession {
    session: usize,
    transport: ScriptedTransport,
}

#[async_trait]
impl Fetcher for ScriptedSession {
    async fn fetch(&self, request: &OutboundRequest) -> Result<FetchResponse, FetchError> {
        let counters = &self.transport.counters;
        counters.requests.fetch_add(1, Ordering::AcqRel);
        let now = counters
            .in_flight
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1);
        counters.peak.fetch_max(now, Ordering::AcqRel);
        self.transport
            .seen_urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.url.clone());

        let reply = (self.transport.script)(self.session, request);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        counters.in_flight.fetch_sub(1, Ordering::AcqRel);
        if reply.crash {
            std::panic::resume_unwind(Box::new("request task crashed"));
        }
        reply.result
    }
}

/// Observer that remembers what it was told.
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    completed: Mutex<Vec<usize>>,
    rounds: Mutex<Vec<(usize, RoundTally)>>,
    started: Mutex<Vec<(usize, usize)>>,
}

impl RecordingObserver {
    pub(crate) fn completion_order(&self) -> Vec<usize> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn round_tallies(&self) -> Vec<(usize, RoundTally)> {
        self.rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn rounds_started(&self) -> Vec<(usize, usize)> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn round_started(&self, round: usize, total: usize) {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((round, total));
    }

    fn request_completed(&self, outcome: &RequestOutcome) {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome.index());
    }

    fn round_completed(&self, round: usize, tally: &RoundTally) {
        self.rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((round, *tally));
    }
}
