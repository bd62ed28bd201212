use tokio::time::Instant;
use tracing::debug;

use crate::error::FetchError;
use crate::metrics::{RequestOutcome, format_millis};
use crate::run::ProgressObserver;

use super::fetcher::{Fetcher, OutboundRequest};

/// Run one request to completion and classify it.
///
/// Never fails: transport errors, including hitting `request.timeout`, come
/// back as a failed [`RequestOutcome`] with the time spent up to the failure.
pub async fn execute_request(
    fetcher: &dyn Fetcher,
    request: &OutboundRequest,
    observer: &dyn ProgressObserver,
) -> RequestOutcome {
    let start = Instant::now();
    let result = match tokio::time::timeout(request.timeout, fetcher.fetch(request)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(FetchError::timeout(format!(
            "no response within {}ms",
            request.timeout.as_millis()
        ))),
    };
    let elapsed = start.elapsed();

    let outcome = match result {
        Ok(response) => {
            debug!(
                index = request.index,
                status = response.status,
                bytes = response.bytes,
                "request completed in {}ms",
                format_millis(elapsed, 1)
            );
            RequestOutcome::success(request.index, response.status, response.bytes, elapsed)
        }
        Err(err) => {
            debug!(
                index = request.index,
                kind = err.kind.as_str(),
                "request failed after {}ms: {}",
                format_millis(elapsed, 1),
                err.message
            );
            RequestOutcome::failure(request.index, elapsed, err.to_string())
        }
    };

    observer.request_completed(&outcome);
    outcome
}
