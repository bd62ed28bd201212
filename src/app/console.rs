use crate::metrics::{RequestOutcome, RoundTally, format_millis};
use crate::run::ProgressObserver;

/// Prints live progress to stdout as requests and rounds finish.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConsoleProgress {
    quiet: bool,
}

impl ConsoleProgress {
    pub(crate) const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressObserver for ConsoleProgress {
    fn round_started(&self, round: usize, total: usize) {
        println!();
        println!("{}", round_header(round, total));
    }

    fn request_completed(&self, outcome: &RequestOutcome) {
        if !self.quiet {
            println!("{}", progress_line(outcome));
        }
    }

    fn round_completed(&self, _round: usize, tally: &RoundTally) {
        println!("{}", tally_line(tally));
    }
}

pub(crate) fn round_header(round: usize, total: usize) -> String {
    format!("--- ROUND {}/{} ---", round, total)
}

pub(crate) fn progress_line(outcome: &RequestOutcome) -> String {
    let millis = format_millis(outcome.elapsed(), 1);
    match outcome.status() {
        Some(status) => format!(
            "[T-{}] {} - {} bytes - {} ms",
            outcome.index(),
            status,
            outcome.bytes(),
            millis
        ),
        None => format!(
            "[T-{}] ERROR: {} - {} ms",
            outcome.index(),
            outcome.error(),
            millis
        ),
    }
}

pub(crate) fn tally_line(tally: &RoundTally) -> String {
    format!(
        "Round completed - success: {}, 429: {}, errors: {}",
        tally.success, tally.rate_limited, tally.errors
    )
}
