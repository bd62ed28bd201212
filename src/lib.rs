//! Core library for the `volley` CLI.
//!
//! `volley` sends rounds of concurrent GET requests to a site the operator
//! owns, records every outcome, summarizes the run and saves per-request
//! results to CSV. The library exposes the building blocks used by the
//! binary: CLI argument types, configuration loading, the request executor,
//! the round dispatcher and scheduler, metrics aggregation, and output sinks.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod run;
pub mod shutdown;
pub mod sinks;
