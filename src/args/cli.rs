use clap::Parser;
use std::time::Duration;

use super::parsers::{
    parse_bool_env, parse_concurrency, parse_delay, parse_duration_arg, parse_positive_usize,
};
use super::types::{PositiveUsize, RunMode};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Controlled HTTP load generator for sites you own: rounds of concurrent GET requests with per-request results saved to CSV."
)]
pub struct VolleyArgs {
    /// Target URL (http:// or https://)
    #[arg(long, short)]
    pub url: Option<String>,

    /// Run a single probe request or rounds of concurrent requests
    #[arg(long, value_enum, default_value = "turbo", ignore_case = true)]
    pub mode: RunMode,

    /// Requests per round (clamped to 1..=5000)
    #[arg(long, short = 'c', default_value = "10", value_parser = parse_concurrency)]
    pub concurrency: u64,

    /// Number of rounds
    #[arg(long, short = 'r', default_value = "1", value_parser = parse_positive_usize)]
    pub rounds: PositiveUsize,

    /// Pause between rounds (bare number is ms; supports ms/s/m/h)
    #[arg(long, default_value = "0", value_parser = parse_delay)]
    pub delay: Duration,

    /// Append a unique query parameter to every request
    #[arg(long = "cache-bust")]
    pub cache_bust: bool,

    /// Per-request timeout (bare number is seconds; supports ms/s/m/h)
    #[arg(long, default_value = "30s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Directory the results CSV is written to
    #[arg(long = "output-dir", default_value = ".")]
    pub output_dir: String,

    /// Also export summary and records as JSON to this path
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Suppress per-request progress lines
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Confirm you own the target and skip the interactive confirmation
    #[arg(long = "authorized", env = "VOLLEY_AUTHORIZED", value_parser = parse_bool_env)]
    pub authorized: bool,

    /// Path to a TOML or JSON config file (defaults to volley.toml / volley.json)
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose diagnostics
    #[arg(long, short)]
    pub verbose: bool,
}
