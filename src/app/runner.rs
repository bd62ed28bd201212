use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::args::{RunMode, VolleyArgs};
use crate::error::{AppError, AppResult};
use crate::http::ReqwestTransport;
use crate::metrics::summarize;
use crate::run::{Concurrency, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, RoundScheduler, RunPlan};
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};
use crate::sinks::{export_json, write_results};

use super::console::ConsoleProgress;
use super::summary::print_summary;

/// Where and how the finished run is reported.
#[derive(Debug, Clone)]
pub(crate) struct RunOutputs {
    pub(crate) output_dir: PathBuf,
    pub(crate) export_json: Option<PathBuf>,
    pub(crate) quiet: bool,
}

impl RunOutputs {
    pub(crate) fn from_args(args: &VolleyArgs) -> Self {
        Self {
            output_dir: PathBuf::from(&args.output_dir),
            export_json: args.export_json.as_ref().map(PathBuf::from),
            quiet: args.quiet,
        }
    }
}

/// Turn validated arguments into a run plan, warning about anything adjusted
/// or ignored along the way.
pub(crate) fn plan_from_args(args: &VolleyArgs, url: String) -> RunPlan {
    match args.mode {
        RunMode::Probe => {
            if usize::try_from(args.concurrency).ok() != Some(DEFAULT_CONCURRENCY)
                || args.rounds.get() != 1
                || !args.delay.is_zero()
                || args.cache_bust
            {
                warn!("Probe mode sends a single request; concurrency, rounds, delay and cache-bust are ignored.");
            }
            RunPlan::probe(url, args.timeout)
        }
        RunMode::Turbo => {
            let concurrency = Concurrency::clamped(args.concurrency);
            if u64::try_from(concurrency.get()).ok() != Some(args.concurrency) {
                warn!(
                    requested = args.concurrency,
                    "Concurrency must be between 1 and {}; using {}.",
                    MAX_CONCURRENCY,
                    concurrency.get()
                );
            }
            RunPlan::turbo(
                url,
                concurrency,
                args.rounds,
                args.delay,
                args.cache_bust,
                args.timeout,
            )
        }
    }
}

/// Run the plan to completion, print the summary and persist the results.
/// An operator interrupt ends the run without persisting anything.
///
/// # Errors
///
/// Returns an error when the results cannot be written.
pub(crate) async fn run_volley(plan: RunPlan, outputs: RunOutputs) -> AppResult<()> {
    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    info!(
        "Starting run: concurrency={}, rounds={}, delay={}ms, cache_bust={}",
        plan.concurrency.get(),
        plan.rounds.get(),
        plan.delay.as_millis(),
        plan.cache_bust
    );
    let transport = Arc::new(ReqwestTransport::new(plan.timeout));
    let observer = Arc::new(ConsoleProgress::new(outputs.quiet));
    let mut scheduler = RoundScheduler::new(plan, transport, observer);

    let result = scheduler.run(&mut shutdown_rx).await.map_err(AppError::run);
    signal_handle.abort();

    let run = match result {
        Ok(run) => run,
        Err(err) if err.is_cancelled() => {
            println!();
            println!("Run cancelled.");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let summary = summarize(&run);
    print_summary(&run, &summary);

    let path = write_results(&run, &outputs.output_dir)
        .await
        .inspect_err(|err| error!("Failed to save results: {}", err))?;
    println!("Details saved to '{}'.", path.display());

    if let Some(json_path) = outputs.export_json.as_ref() {
        export_json(json_path, &run, &summary)
            .await
            .inspect_err(|err| error!("Failed to export JSON: {}", err))?;
        println!("JSON export saved to '{}'.", json_path.display());
    }

    Ok(())
}
